//! Subnet CIDR allocation.
//!
//! Carves a /24 out of a base network by adding an offset to its third
//! octet: `A.B.C.D/P` with offset `n` gives `A.B.(C+n).0/24`. The base prefix
//! must be at least /16; beyond that check it is ignored, the result is
//! always a /24.

use crate::error::CidrError;
use crate::models::Ipv4;
use std::net::Ipv4Addr;

/// Shortest base prefix that leaves the third octet free for offsets.
pub const MIN_BASE_PREFIX: u8 = 16;

/// Prefix of every allocated subnet.
pub const SUBNET_PREFIX: u8 = 24;

/// Compute the /24 subnet CIDR at `offset` within `base_cidr`.
///
/// # Examples
/// ```
/// use aws_subnet_plan::allocator::subnet_cidr;
/// assert_eq!(subnet_cidr("10.0.0.0/16", 3).unwrap(), "10.0.3.0/24");
/// ```
pub fn subnet_cidr(base_cidr: &str, offset: u32) -> Result<String, CidrError> {
    let octets = parse_base_cidr(base_cidr)?;
    let third = offset_octet(octets[2], offset)?;
    Ok(format!("{}.{}.{}.0/{}", octets[0], octets[1], third, SUBNET_PREFIX))
}

/// Same as [`subnet_cidr`] for an already parsed base network.
pub fn subnet_ipv4(base: Ipv4, offset: u32) -> Result<Ipv4, CidrError> {
    if base.mask < MIN_BASE_PREFIX {
        return Err(CidrError::InvalidCidrFormat(base.to_string()));
    }
    let [a, b, c, _] = base.addr.octets();
    Ok(Ipv4 {
        addr: Ipv4Addr::new(a, b, offset_octet(c, offset)?, 0),
        mask: SUBNET_PREFIX,
    })
}

fn offset_octet(third_octet: u8, offset: u32) -> Result<u8, CidrError> {
    (third_octet as u32)
        .checked_add(offset)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or(CidrError::OctetOverflow {
            third_octet,
            offset,
        })
}

/// Split `A.B.C.D/P` into its four octets, checking the prefix bounds.
fn parse_base_cidr(base_cidr: &str) -> Result<[u8; 4], CidrError> {
    let input = base_cidr.trim();
    let invalid = || CidrError::InvalidCidrFormat(input.to_string());

    let (addr, prefix) = input.split_once('/').ok_or_else(invalid)?;
    let parts: Vec<&str> = addr.split('.').collect();
    if parts.len() != 4 {
        return Err(invalid());
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        let text = part.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        // any integer that is not 0..=255, however long, is an octet error
        *octet = match digits.parse::<u8>() {
            Ok(0) => 0,
            Ok(value) if !negative => value,
            _ => {
                return Err(CidrError::InvalidOctet {
                    octet: part.to_string(),
                    input: input.to_string(),
                })
            }
        };
    }

    let prefix: u8 = prefix.trim().parse().map_err(|_| invalid())?;
    if !(MIN_BASE_PREFIX..=32).contains(&prefix) {
        log::debug!("prefix /{prefix} out of range for {input}");
        return Err(invalid());
    }

    Ok(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_cidr_scenarios() {
        assert_eq!(subnet_cidr("10.0.0.0/16", 3).unwrap(), "10.0.3.0/24");
        assert_eq!(subnet_cidr("10.1.0.0/16", 0).unwrap(), "10.1.0.0/24");
        assert_eq!(subnet_cidr("10.0.0.0/16", 5).unwrap(), "10.0.5.0/24");
        // a /24 base passes the /16 minimum, offset still moves the third octet
        assert_eq!(subnet_cidr("10.0.0.0/24", 1).unwrap(), "10.0.1.0/24");
    }

    #[test]
    fn test_malformed_address() {
        assert_eq!(
            subnet_cidr("10.0.0/16", 1),
            Err(CidrError::InvalidCidrFormat("10.0.0/16".to_string()))
        );
        assert!(matches!(
            subnet_cidr("10.0.0.0.0/16", 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert!(matches!(
            subnet_cidr("10.0.0.0", 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert!(matches!(
            subnet_cidr("10.a.0.0/16", 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert!(matches!(
            subnet_cidr("10.0.0.0/abc", 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
    }

    #[test]
    fn test_prefix_bounds() {
        assert!(matches!(
            subnet_cidr("10.0.0.0/15", 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert!(matches!(
            subnet_cidr("10.0.0.0/33", 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert_eq!(subnet_cidr("10.0.0.0/32", 2).unwrap(), "10.0.2.0/24");
    }

    #[test]
    fn test_invalid_octet() {
        assert_eq!(
            subnet_cidr("10.0.256.0/16", 0),
            Err(CidrError::InvalidOctet {
                octet: "256".to_string(),
                input: "10.0.256.0/16".to_string(),
            })
        );
        assert!(matches!(
            subnet_cidr("-1.0.0.0/16", 0),
            Err(CidrError::InvalidOctet { .. })
        ));

        // too long for any integer type, still an out of range octet
        assert_eq!(
            subnet_cidr("10.0.99999999999999999999.0/16", 0),
            Err(CidrError::InvalidOctet {
                octet: "99999999999999999999".to_string(),
                input: "10.0.99999999999999999999.0/16".to_string(),
            })
        );
        assert!(matches!(
            subnet_cidr("10.0.-99999999999999999999.0/16", 0),
            Err(CidrError::InvalidOctet { .. })
        ));
        assert!(matches!(
            subnet_cidr("10.0.1x.0/16", 0),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert!(matches!(
            subnet_cidr("10.0.-.0/16", 0),
            Err(CidrError::InvalidCidrFormat(_))
        ));
    }

    #[test]
    fn test_octet_overflow() {
        assert_eq!(subnet_cidr("10.0.250.0/16", 5).unwrap(), "10.0.255.0/24");
        assert_eq!(
            subnet_cidr("10.0.250.0/16", 6),
            Err(CidrError::OctetOverflow {
                third_octet: 250,
                offset: 6
            })
        );
        assert!(matches!(
            subnet_cidr("10.0.0.0/16", u32::MAX),
            Err(CidrError::OctetOverflow { .. })
        ));
    }

    #[test]
    fn test_fourth_octet_and_prefix_forced() {
        assert_eq!(subnet_cidr("10.0.7.99/20", 1).unwrap(), "10.0.8.0/24");
        assert_eq!(subnet_cidr(" 172.16.0.0/16 ", 4).unwrap(), "172.16.4.0/24");
    }

    #[test]
    fn test_idempotent_and_monotonic() {
        let base = "10.20.0.0/16";
        for offset in 0..=255u32 {
            let first = subnet_cidr(base, offset).unwrap();
            assert_eq!(first, subnet_cidr(base, offset).unwrap());

            let cidr = Ipv4::new(&first).unwrap();
            assert_eq!(cidr.mask, 24);
            assert_eq!(cidr.addr.octets()[2] as u32, offset);
            assert!(cidr.is_network_aligned());
        }
    }

    #[test]
    fn test_subnet_ipv4_matches_string_form() {
        let base = Ipv4::new("10.0.0.0/16").unwrap();
        for offset in [0u32, 3, 4, 5, 6, 255] {
            assert_eq!(
                subnet_ipv4(base, offset).unwrap().to_string(),
                subnet_cidr("10.0.0.0/16", offset).unwrap()
            );
        }
        assert!(matches!(
            subnet_ipv4(Ipv4::new("10.0.0.0/8").unwrap(), 1),
            Err(CidrError::InvalidCidrFormat(_))
        ));
        assert!(matches!(
            subnet_ipv4(base, 256),
            Err(CidrError::OctetOverflow { .. })
        ));
    }
}
