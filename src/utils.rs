use crate::{PingError, PingResult};
use std::net::IpAddr;

/// Resolves `hostname` to its first address. IP literals are taken as they are.
pub fn lookup_host(hostname: &str) -> PingResult<IpAddr> {
    if let Ok(ip_addr) = hostname.parse::<IpAddr>() {
        return Ok(ip_addr);
    }
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(hostname)
        .map_err(|e| PingError::Resolve { host: hostname.to_owned(), reason: e.to_string() })?;
    ips.into_iter()
        .next()
        .ok_or_else(|| PingError::Resolve { host: hostname.to_owned(), reason: "no address found".to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_lookup_ipv4_literal() {
        let ip = lookup_host("192.0.2.7").unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)));
    }

    #[test]
    fn test_lookup_ipv6_literal() {
        let ip = lookup_host("::1").unwrap();
        assert_eq!(ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[test]
    fn test_lookup_host() {
        let ip = lookup_host("localhost").unwrap();
        assert!(ip.is_loopback());
    }

    #[test]
    fn test_lookup_invalid_host() {
        let result = lookup_host("host name with spaces.invalid");
        assert!(matches!(result, Err(PingError::Resolve { .. })));
    }
}
