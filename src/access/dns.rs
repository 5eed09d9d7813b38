use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

/// Resolves a host name to its IPv4 addresses.
pub trait DnsClient {
    fn lookup(&self, domain: &str) -> io::Result<Vec<Ipv4Addr>>;
}

/// Resolves through the system resolver. Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkDnsClient;

impl DnsClient for NetworkDnsClient {
    fn lookup(&self, domain: &str) -> io::Result<Vec<Ipv4Addr>> {
        let mut addresses: Vec<Ipv4Addr> = (domain, 0)
            .to_socket_addrs()?
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(*v4.ip()),
                SocketAddr::V6(_) => None,
            })
            .collect();
        addresses.dedup();
        Ok(addresses)
    }
}

/// Resolves every name to nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopDnsClient;

impl DnsClient for NopDnsClient {
    fn lookup(&self, _domain: &str) -> io::Result<Vec<Ipv4Addr>> {
        Ok(Vec::new())
    }
}
