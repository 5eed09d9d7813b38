//! Address-based access control: cidr blocks, `.htaccess` rule lists and the
//! DNS lookups rule lists may need.

pub mod cidr;
pub mod dns;
pub mod htaccess;

pub use cidr::{CidrBlock, CidrError};
pub use dns::{DnsClient, NetworkDnsClient, NopDnsClient};
pub use htaccess::{HtAccess, HtAccessError, HtAccessRule, parse_htaccess_rules};
