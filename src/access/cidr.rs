use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

const BITS_IN_ADDRESS: u8 = 32;

/// Network mask for a prefix length: the top `length` bits set.
///
/// # Example
///
/// ```
/// # use sluice::access::cidr::mask;
/// assert_eq!(mask(0), 0);
/// assert_eq!(mask(8), 0xFF00_0000);
/// assert_eq!(mask(32), u32::MAX);
/// ```
pub fn mask(length: u8) -> u32 {
    match length {
        0 => 0,
        len if len >= BITS_IN_ADDRESS => u32::MAX,
        len => u32::MAX << (BITS_IN_ADDRESS - len),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Prefix length above 32.
    InvalidLength(u8),
    /// The prefix has bits set below its length, e.g. `10.0.0.1/8`.
    HostBitsSet { prefix: Ipv4Addr, length: u8 },
    /// Not of the form `a.b.c.d/len`.
    Malformed(String),
}

impl fmt::Display for CidrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CidrError::InvalidLength(length) => write!(f, "prefix length {length} is larger than 32"),
            CidrError::HostBitsSet { prefix, length } => {
                write!(f, "{prefix}/{length} has bits set outside its prefix")
            }
            CidrError::Malformed(s) => write!(f, "'{s}' is not a cidr block"),
        }
    }
}

impl std::error::Error for CidrError {}

/// A contiguous IPv4 range written as `prefix/length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBlock {
    prefix: Ipv4Addr,
    length: u8,
}

impl CidrBlock {
    /// Fails if `length > 32` or `prefix` has bits set outside the mask.
    pub fn new(prefix: Ipv4Addr, length: u8) -> Result<Self, CidrError> {
        if length > BITS_IN_ADDRESS {
            return Err(CidrError::InvalidLength(length));
        }
        if u32::from(prefix) & mask(length) != u32::from(prefix) {
            return Err(CidrError::HostBitsSet { prefix, length });
        }
        Ok(Self { prefix, length })
    }

    /// A block matching exactly one address.
    pub fn host(address: Ipv4Addr) -> Self {
        Self {
            prefix: address,
            length: BITS_IN_ADDRESS,
        }
    }

    pub fn prefix(&self) -> Ipv4Addr {
        self.prefix
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn matches(&self, address: Ipv4Addr) -> bool {
        u32::from(address) & mask(self.length) == u32::from(self.prefix)
    }
}

impl FromStr for CidrBlock {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CidrError::Malformed(s.to_string());

        let (prefix, length) = s.split_once('/').ok_or_else(malformed)?;
        let prefix: Ipv4Addr = prefix.parse().map_err(|_| malformed())?;
        let length: u8 = length.parse().map_err(|_| malformed())?;

        CidrBlock::new(prefix, length)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.length)
    }
}
