//! IPv4 address and CIDR notation utilities.
//!
//! Provides [`Ipv4`] struct for representing IPv4 networks in CIDR notation,
//! along with the mask arithmetic used by the allocator and the plan checks.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Longest prefix AWS accepts for a VPC subnet.
pub const AWS_MAX_SUBNET_LENGTH: u8 = 28;

/// Addresses AWS keeps back in every subnet (network, router, DNS, future, broadcast).
pub const AWS_RESERVED_HOSTS: u64 = 5;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use aws_subnet_plan::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, Box<dyn Error>> {
    if len > MAX_LENGTH {
        Err("Network length is too long".into())
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Returns the IP address following the given subnet.
pub fn ip_after_subnet(addr: Ipv4Addr, cidr: u8) -> Result<Ipv4Addr, Box<dyn Error>> {
    let network_bits = u32::from(addr) & get_cidr_mask(cidr)?;
    let subnet_size = 1u64 << (MAX_LENGTH - cidr);
    let next_bits = network_bits as u64 + subnet_size;
    if next_bits > u32::MAX as u64 {
        return Err("Next subnet calculation overflowed".into());
    }
    Ok(Ipv4Addr::from(next_bits as u32))
}

/// Calculate the next subnet after the given [`Ipv4`] subnet.
///
/// If `mask` is provided, the next subnet will use that mask size.
pub fn next_subnet_ipv4(ipv4: Ipv4, mask: Option<u8>) -> Result<Ipv4, Box<dyn Error>> {
    let new_mask = mask.unwrap_or(ipv4.mask);
    let addr = if new_mask <= ipv4.mask {
        ip_after_subnet(ipv4.addr, new_mask)?
    } else {
        // smaller subnet, start after the current broadcast
        ip_after_subnet(broadcast_addr(ipv4.addr, ipv4.mask)?, new_mask)?
    };
    Ok(Ipv4 {
        addr,
        mask: new_mask,
    })
}

/// Number of usable host addresses in an AWS subnet of prefix `len`.
pub fn num_aws_hosts(len: u8) -> Result<u64, Box<dyn Error>> {
    if len > AWS_MAX_SUBNET_LENGTH {
        Err(format!("AWS subnets can not be smaller than /{AWS_MAX_SUBNET_LENGTH}").into())
    } else {
        Ok((1u64 << (MAX_LENGTH - len)) - AWS_RESERVED_HOSTS)
    }
}

/// Smallest prefix length for which `ip` is a valid network address.
pub fn lo_mask(ip: Ipv4Addr) -> u8 {
    let trailing_zeros = u32::from(ip).trailing_zeros() as u8;
    MAX_LENGTH - trailing_zeros.min(MAX_LENGTH)
}

/// IPv4 network in CIDR notation.
///
/// Ordered by address first, then by mask, so a covering network sorts
/// before the subnets it contains.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The IPv4 address.
    pub addr: Ipv4Addr,
    /// The subnet mask length (0-32).
    pub mask: u8,
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR {s}: {e}")))
    }
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/16").
    pub fn new(addr_cidr: &str) -> Result<Ipv4, Box<dyn Error>> {
        let (addr, mask) = addr_cidr
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("Invalid address/mask {addr_cidr}"))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr}"))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| format!("Invalid subnet mask {mask}"))?;
        if mask > MAX_LENGTH {
            return Err("Network length is too long".into());
        }
        Ok(Ipv4 { addr, mask })
    }

    /// Get the broadcast address for this subnet.
    pub fn broadcast(&self) -> Result<Ipv4, Box<dyn Error>> {
        Ok(Ipv4 {
            addr: broadcast_addr(self.addr, self.mask)?,
            mask: self.mask,
        })
    }

    /// Lowest (network) address. `mask` is at most 32 for values built by
    /// [`Ipv4::new`], so the mask arithmetic can not fail.
    pub fn lo(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        Ipv4Addr::from(u32::from(self.addr) & mask)
    }

    /// Highest (broadcast) address in the subnet.
    pub fn hi(&self) -> Ipv4Addr {
        let mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        Ipv4Addr::from((u32::from(self.addr) & mask) | !mask)
    }

    /// True when no host bits are set in `addr`.
    pub fn is_network_aligned(&self) -> bool {
        self.addr == self.lo()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        ip >= self.lo() && ip <= self.hi()
    }

    /// True when `other` lies entirely inside this network.
    pub fn contains_net(&self, other: &Ipv4) -> bool {
        self.contains(other.lo()) && self.contains(other.hi())
    }

    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl FromStr for Ipv4 {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ipv4::new(s)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
