// Address classification (pure, no I/O)

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// IP address family of a textual address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "ipv4"),
            AddressFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// Classify `candidate` as an IPv4 or IPv6 literal
///
/// IPv4 must be strict dotted-decimal with four octets (`1.2.3` and
/// `256.1.1.1` are rejected). IPv6 follows the standard textual forms,
/// including `::` compression and embedded IPv4 tails. Zone suffixes
/// (`fe80::1%eth0`) are not addresses.
pub fn classify_address(candidate: &str) -> Option<AddressFamily> {
    if candidate.parse::<Ipv4Addr>().is_ok() {
        return Some(AddressFamily::Ipv4);
    }

    if candidate.parse::<Ipv6Addr>().is_ok() {
        return Some(AddressFamily::Ipv6);
    }

    None
}

/// Whether `candidate` is a valid IPv4 or IPv6 address
///
/// # Example
/// ```
/// use hostkit_core::is_ip_address;
///
/// assert!(is_ip_address("127.0.0.1"));
/// assert!(is_ip_address("::1"));
/// assert!(!is_ip_address("localhost"));
/// ```
pub fn is_ip_address(candidate: &str) -> bool {
    classify_address(candidate).is_some()
}
