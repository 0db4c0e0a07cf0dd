//! Network utilities
//!
//! Address helpers for active-mode data connections.

use std::net::{IpAddr, Ipv4Addr};

use crate::error::ConnectionError;

/// The IPv4 address to announce in PORT for a control socket bound to `ip`.
///
/// IPv4-mapped IPv6 addresses are unwrapped; other IPv6 addresses cannot be
/// expressed in a PORT command.
pub fn active_mode_ip(ip: IpAddr) -> Result<Ipv4Addr, ConnectionError> {
    match ip {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .ok_or(ConnectionError::UnsupportedAddress(ip)),
    }
}

/// `host:port` text used in logs and error messages
pub fn display_target(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn mapped_addresses_are_unwrapped() {
        let mapped = IpAddr::V6(Ipv4Addr::new(10, 0, 0, 7).to_ipv6_mapped());
        assert_eq!(active_mode_ip(mapped).unwrap(), Ipv4Addr::new(10, 0, 0, 7));
        assert!(active_mode_ip(IpAddr::V6(Ipv6Addr::LOCALHOST)).is_err());
    }

    #[test]
    fn ipv6_targets_are_bracketed() {
        assert_eq!(display_target("::1", 21), "[::1]:21");
        assert_eq!(display_target("ftp.example.com", 2121), "ftp.example.com:2121");
    }
}
