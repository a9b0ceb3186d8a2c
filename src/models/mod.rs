//! Domain models for the subnet plan.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Ipv4`] - IPv4 network with CIDR notation support
//! - [`PlannedSubnet`] - a subnet with its allocated CIDR and zone
//! - [`ExistingSubnet`] - a subnet already present in the VPC
//! - [`AzGroup`] and [`AzLayout`] - subnets grouped by availability zone

mod az_layout;
mod ipv4;
mod subnet;

// Re-export public types
pub use az_layout::{AzGroup, AzLayout};
pub use ipv4::{
    broadcast_addr, cut_addr, get_cidr_mask, ip_after_subnet, lo_mask, next_subnet_ipv4,
    num_aws_hosts, Ipv4, AWS_MAX_SUBNET_LENGTH, AWS_RESERVED_HOSTS, MAX_LENGTH,
};
pub use subnet::{ExistingSubnet, PlannedSubnet, SubnetTier};
