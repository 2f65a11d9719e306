//! IPv4 argument validation

use netops_core::{Error, Result};
use std::net::Ipv4Addr;

/// Parse a dotted-quad IPv4 address (four decimal octets, each 0-255).
///
/// Surrounding whitespace is not accepted; callers pass raw model arguments.
pub fn parse_ipv4(raw: &str) -> Result<Ipv4Addr> {
    raw.parse::<Ipv4Addr>().map_err(|_| {
        Error::invalid_argument(format!("'{}' is not a valid IPv4 address", raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_core::ErrorKind;

    #[test]
    fn test_valid_addresses() {
        assert_eq!(parse_ipv4("192.168.1.10").unwrap(), Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(parse_ipv4("0.0.0.0").unwrap(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(parse_ipv4("255.255.255.255").unwrap(), Ipv4Addr::BROADCAST);
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in [
            "999.1.1.1",
            "999.999.999.999",
            "abc",
            "",
            "1.2.3",
            "1.2.3.4.5",
            " 1.2.3.4",
            "asw1",
            "::1",
        ] {
            let err = parse_ipv4(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "input {:?}", raw);
        }
    }
}
