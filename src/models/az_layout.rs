//! Planned subnets grouped by availability zone.

use super::PlannedSubnet;
use std::collections::BTreeMap;
use std::fmt;

/// Subnets placed in one availability zone.
#[derive(Debug)]
pub struct AzGroup<'a> {
    pub availability_zone: &'a str,
    pub subnets: Vec<&'a PlannedSubnet>,
}

impl<'a> AzGroup<'a> {
    pub fn new(subnet: &'a PlannedSubnet) -> AzGroup<'a> {
        AzGroup {
            availability_zone: &subnet.availability_zone,
            subnets: vec![subnet],
        }
    }

    pub fn add_subnet(&mut self, subnet: &'a PlannedSubnet) {
        self.subnets.push(subnet);
    }

    /// Number of public subnets in this zone.
    pub fn public_count(&self) -> usize {
        self.subnets
            .iter()
            .filter(|s| s.map_public_ip_on_launch())
            .count()
    }
}

/// Collection of [`AzGroup`]s keyed by zone name, in zone order.
pub struct AzLayout<'a> {
    pub zones: BTreeMap<&'a str, AzGroup<'a>>,
}

impl<'a> AzLayout<'a> {
    pub fn new() -> AzLayout<'a> {
        AzLayout {
            zones: BTreeMap::new(),
        }
    }

    /// Place a subnet in its zone, creating the zone entry on first use.
    pub fn add_subnet(&mut self, subnet: &'a PlannedSubnet) {
        self.zones
            .entry(subnet.availability_zone.as_str())
            .and_modify(|group| group.add_subnet(subnet))
            .or_insert_with(|| AzGroup::new(subnet));
    }
}

impl<'a> Default for AzLayout<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> fmt::Display for AzGroup<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cidrs: Vec<String> = self.subnets.iter().map(|s| s.cidr.to_string()).collect();
        write!(
            f,
            "{} [{}] ({} subnets, {} public)",
            self.availability_zone,
            cidrs.join(", "),
            self.subnets.len(),
            self.public_count()
        )
    }
}

impl<'a> fmt::Display for AzLayout<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AzLayout ({} zones):", self.zones.len())?;
        for group in self.zones.values() {
            writeln!(f, "  - {group}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ipv4, SubnetTier};

    fn subnet(name: &str, cidr: &str, az: &str, tier: SubnetTier) -> PlannedSubnet {
        PlannedSubnet {
            name: name.to_string(),
            cidr: Ipv4::new(cidr).unwrap(),
            offset: 0,
            availability_zone: az.to_string(),
            tier,
        }
    }

    #[test]
    fn test_group_by_zone() {
        let subnets = vec![
            subnet("priv-a", "10.0.3.0/24", "us-east-2a", SubnetTier::Private),
            subnet("priv-b", "10.0.4.0/24", "us-east-2a", SubnetTier::Private),
            subnet("pub-a", "10.0.5.0/24", "us-east-2b", SubnetTier::Public),
        ];
        let mut layout = AzLayout::new();
        for s in &subnets {
            layout.add_subnet(s);
        }

        assert_eq!(layout.zones.len(), 2);
        assert_eq!(layout.zones["us-east-2a"].subnets.len(), 2);
        assert_eq!(layout.zones["us-east-2b"].public_count(), 1);
        assert_eq!(
            layout.zones["us-east-2b"].to_string(),
            "us-east-2b [10.0.5.0/24] (1 subnets, 1 public)"
        );
        assert!(layout.to_string().starts_with("AzLayout (2 zones):"));
    }
}
