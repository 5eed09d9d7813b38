use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::os::unix::io::{AsRawFd, RawFd};
use std::rc::Rc;

use bytes::Bytes;

use crate::net::socket::{AutoClosingSocket, ConnectionConfig, SocketReadPollable, SocketWritePollable};
use crate::reactor::{Callback, Pollable};

/// A byte stream whose reads and writes are expressed as pollables.
///
/// Every call builds one pending operation; nothing happens until the
/// returned pollable is registered with a reactor and becomes ready.
pub trait AsyncConnection {
    /// Reads whatever is available (at least one byte) and passes it on.
    fn read(&self, callback: Callback<Bytes>) -> Box<dyn Pollable>;

    /// Writes the whole payload, then runs the callback.
    fn write(&self, payload: Bytes, callback: Callback<()>) -> Box<dyn Pollable>;

    /// Address of the peer.
    fn remote_addr(&self) -> Ipv4Addr;

    /// Limits the layers above must honour.
    fn config(&self) -> ConnectionConfig;
}

/// An accepted TCP client.
///
/// Cheap to clone: clones share the same socket, which is closed when the
/// last clone and the last pending operation are gone.
#[derive(Debug, Clone)]
pub struct SocketConnection {
    socket: Rc<AutoClosingSocket>,
    remote: Ipv4Addr,
    config: ConnectionConfig,
}

impl SocketConnection {
    pub fn new(stream: TcpStream, peer: SocketAddr, config: ConnectionConfig) -> std::io::Result<Self> {
        Ok(Self {
            socket: Rc::new(AutoClosingSocket::new(stream)?),
            remote: ipv4_of(peer.ip()),
            config,
        })
    }

    pub fn descriptor(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

impl AsyncConnection for SocketConnection {
    fn read(&self, callback: Callback<Bytes>) -> Box<dyn Pollable> {
        Box::new(SocketReadPollable::new(self.socket.clone(), self.config, callback))
    }

    fn write(&self, payload: Bytes, callback: Callback<()>) -> Box<dyn Pollable> {
        Box::new(SocketWritePollable::new(self.socket.clone(), self.config, payload, callback))
    }

    fn remote_addr(&self) -> Ipv4Addr {
        self.remote
    }

    fn config(&self) -> ConnectionConfig {
        self.config
    }
}

// Access rules are IPv4 only; v4-mapped v6 peers keep their address.
fn ipv4_of(ip: IpAddr) -> Ipv4Addr {
    match ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => v6.to_ipv4_mapped().unwrap_or(Ipv4Addr::UNSPECIFIED),
    }
}
