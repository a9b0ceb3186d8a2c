//! Planned VPC subnet.

use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a subnet routes through the internet gateway or a NAT gateway.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubnetTier {
    Public,
    Private,
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetTier::Public => write!(f, "public"),
            SubnetTier::Private => write!(f, "private"),
        }
    }
}

/// A subnet with its allocated CIDR and resolved availability zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlannedSubnet {
    /// Logical name of the subnet.
    pub name: String,
    /// Allocated /24 block.
    pub cidr: Ipv4,
    /// Offset from the VPC third octet that produced `cidr`.
    pub offset: u32,
    /// Availability zone name, e.g. `us-east-2a`.
    pub availability_zone: String,
    pub tier: SubnetTier,
}

impl PlannedSubnet {
    /// Public subnets hand out public IPs to instances on launch.
    pub fn map_public_ip_on_launch(&self) -> bool {
        self.tier == SubnetTier::Public
    }
}

impl fmt::Display for PlannedSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {})",
            self.name, self.cidr, self.tier, self.availability_zone
        )
    }
}

/// A subnet that already exists in the VPC and is not managed by the plan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExistingSubnet {
    /// Provider id, e.g. `subnet-0f7f60a04eee90e0e`.
    pub subnet_id: String,
    pub cidr: Ipv4,
    pub availability_zone: String,
    /// Route table associated with the subnet, if known.
    #[serde(default)]
    pub route_table_id: Option<String>,
}

impl fmt::Display for ExistingSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (existing, {})",
            self.subnet_id, self.cidr, self.availability_zone
        )
    }
}
