use std::fmt;
use std::net::Ipv4Addr;

use crate::access::cidr::CidrBlock;
use crate::access::dns::DnsClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtAccessRule {
    pub block: CidrBlock,
    pub allow: bool,
}

/// Ordered access list. The first rule whose block matches decides; an
/// address no rule matches is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtAccess {
    rules: Vec<HtAccessRule>,
}

impl HtAccess {
    pub fn new(rules: Vec<HtAccessRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[HtAccessRule] {
        &self.rules
    }

    pub fn allows(&self, address: Ipv4Addr) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.block.matches(address))
            .is_none_or(|rule| rule.allow)
    }
}

#[derive(Debug)]
pub enum HtAccessError {
    /// Line is not `<allow|deny> from <host>`.
    InvalidLine { line: usize, text: String },
    /// Directive other than `allow` or `deny`.
    InvalidDirective { line: usize, directive: String },
    Dns { line: usize, host: String, source: std::io::Error },
}

impl fmt::Display for HtAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HtAccessError::InvalidLine { line, text } => write!(f, "line {line}: invalid rule '{text}'"),
            HtAccessError::InvalidDirective { line, directive } => {
                write!(f, "line {line}: expected 'allow' or 'deny', found '{directive}'")
            }
            HtAccessError::Dns { line, host, source } => {
                write!(f, "line {line}: lookup of '{host}' failed: {source}")
            }
        }
    }
}

impl std::error::Error for HtAccessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HtAccessError::Dns { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Parses `.htaccess` contents.
///
/// Each non-blank line not starting with `#` reads `allow from <host>` or
/// `deny from <host>`, where `<host>` is a cidr block, a single address, or
/// anything else, which is resolved through `dns` into one `/32` rule per
/// address.
pub fn parse_htaccess_rules(contents: &str, dns: &dyn DnsClient) -> Result<HtAccess, HtAccessError> {
    let mut rules = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let (directive, host) = text.split_once(" from ").ok_or_else(|| HtAccessError::InvalidLine {
            line,
            text: text.to_string(),
        })?;

        let allow = match directive.trim() {
            "allow" => true,
            "deny" => false,
            other => {
                return Err(HtAccessError::InvalidDirective {
                    line,
                    directive: other.to_string(),
                });
            }
        };

        for block in resolve_host(host.trim(), dns, line)? {
            rules.push(HtAccessRule { block, allow });
        }
    }

    Ok(HtAccess::new(rules))
}

fn resolve_host(host: &str, dns: &dyn DnsClient, line: usize) -> Result<Vec<CidrBlock>, HtAccessError> {
    if let Ok(block) = host.parse::<CidrBlock>() {
        return Ok(vec![block]);
    }

    if let Ok(address) = host.parse::<Ipv4Addr>() {
        return Ok(vec![CidrBlock::host(address)]);
    }

    let addresses = dns.lookup(host).map_err(|source| HtAccessError::Dns {
        line,
        host: host.to_string(),
        source,
    })?;
    if addresses.is_empty() {
        tracing::warn!(line, host, "htaccess host resolved to no addresses");
    }
    Ok(addresses.into_iter().map(CidrBlock::host).collect())
}
