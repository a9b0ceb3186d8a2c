//! Availability zone aggregation.
//!
//! Groups planned subnets into their zones for reporting.

use super::plan::SubnetPlan;
use crate::models::AzLayout;
use std::error::Error;

/// Build an [`AzLayout`] from a subnet plan.
pub fn get_az_layout(plan: &SubnetPlan) -> Result<AzLayout<'_>, Box<dyn Error>> {
    let mut layout = AzLayout::new();
    for subnet in plan.subnets.iter() {
        layout.add_subnet(subnet);
    }
    Ok(layout)
}

/// Print the zone summary to stdout.
///
/// Warns when every subnet sits in one zone; EKS needs at least two.
pub fn print_az_layout(plan: &SubnetPlan, layout: &AzLayout<'_>) -> Result<(), Box<dyn Error>> {
    log::info!(
        "AZs: {} zones used by {} subnets in {}",
        layout.zones.len(),
        plan.subnets.len(),
        plan.vpc_id
    );

    if layout.zones.len() < 2 {
        log::warn!("All subnets of {} are in a single availability zone", plan.vpc_id);
    }

    for (az, group) in &layout.zones {
        println!(
            "AZ: '{az}' - {cidrs}",
            cidrs = group
                .subnets
                .iter()
                .map(|s| format!("{} ({}, {})", s.cidr, s.name, s.tier))
                .collect::<Vec<String>>()
                .join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentConfig;
    use crate::processing::build_subnet_plan;

    #[test]
    fn test_get_az_layout() {
        let plan = build_subnet_plan(&DeploymentConfig::default()).unwrap();
        let layout = get_az_layout(&plan).unwrap();

        assert_eq!(layout.zones.len(), 3);
        assert_eq!(layout.zones["us-east-2a"].subnets.len(), 2);
        assert_eq!(layout.zones["us-east-2a"].public_count(), 0);
        assert_eq!(layout.zones["us-east-2b"].public_count(), 1);
        print_az_layout(&plan, &layout).unwrap();
    }
}
