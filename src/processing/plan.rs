//! Subnet plan construction.
//!
//! Applies the allocator to every configured subnet and checks the result
//! before anything is handed to the cloud provider.

use super::overlap::{find_overlapping_subnets, log_overlapping_subnets};
use crate::allocator::subnet_ipv4;
use crate::config::DeploymentConfig;
use crate::error::PlanError;
use crate::models::{ExistingSubnet, Ipv4, PlannedSubnet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Allocated subnets for one VPC, sorted by CIDR.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubnetPlan {
    pub vpc_id: String,
    pub vpc_cidr: Ipv4,
    pub region: Option<String>,
    pub subnets: Vec<PlannedSubnet>,
    /// Subnets already in the VPC, sorted by CIDR.
    #[serde(default)]
    pub existing_subnets: Vec<ExistingSubnet>,
}

impl SubnetPlan {
    pub fn subnet(&self, name: &str) -> Option<&PlannedSubnet> {
        self.subnets.iter().find(|s| s.name == name)
    }

    /// Every CIDR taken in the VPC, planned or existing, sorted.
    pub fn occupied_cidrs(&self) -> Vec<Ipv4> {
        let mut cidrs: Vec<Ipv4> = self
            .subnets
            .iter()
            .map(|s| s.cidr)
            .chain(self.existing_subnets.iter().map(|s| s.cidr))
            .collect();
        cidrs.sort();
        cidrs
    }
}

/// Build and check the subnet plan for `config`.
///
/// Fails on the first invalid config field, allocator error, unknown zone
/// index, subnet outside the VPC, repeated name, overlapping pair or clash
/// with a subnet that already exists in the VPC.
pub fn build_subnet_plan(config: &DeploymentConfig) -> Result<SubnetPlan, PlanError> {
    config.validate()?;

    let vpc = &config.vpc;
    log::info!(
        "#Start build_subnet_plan() vpc={} cidr={} subnets={}",
        vpc.vpc_id,
        vpc.cidr,
        config.subnets.len()
    );

    let mut seen_names = HashSet::new();
    let mut subnets = Vec::with_capacity(config.subnets.len());

    for s in &config.subnets {
        if !seen_names.insert(s.name.as_str()) {
            return Err(PlanError::DuplicateName(s.name.clone()));
        }

        let cidr = subnet_ipv4(vpc.cidr, s.offset).map_err(|source| PlanError::Allocation {
            name: s.name.clone(),
            source,
        })?;
        if !vpc.cidr.contains_net(&cidr) {
            return Err(PlanError::OutsideVpc {
                name: s.name.clone(),
                cidr,
                vpc: vpc.cidr,
            });
        }
        if let Some(existing) = vpc.existing_subnets.iter().find(|e| e.cidr.overlaps(&cidr)) {
            log::warn!("Overlap: {} {} and {existing}", s.name, cidr);
            return Err(PlanError::OverlapsExisting {
                name: s.name.clone(),
                cidr,
                subnet_id: existing.subnet_id.clone(),
                existing_cidr: existing.cidr,
            });
        }

        let availability_zone = vpc
            .availability_zones
            .get(s.az_index)
            .ok_or_else(|| PlanError::AzIndexOutOfRange {
                name: s.name.clone(),
                index: s.az_index,
                available: vpc.availability_zones.len(),
            })?;

        log::info!(
            "allocated {name:20} offset={offset:3} => {cidr:18} {tier:7} {availability_zone}",
            name = s.name,
            offset = s.offset,
            cidr = cidr.to_string(),
            tier = s.tier.to_string(),
        );

        subnets.push(PlannedSubnet {
            name: s.name.clone(),
            cidr,
            offset: s.offset,
            availability_zone: availability_zone.clone(),
            tier: s.tier,
        });
    }

    subnets.sort_by_key(|s| s.cidr);

    let conflicts = find_overlapping_subnets(&subnets);
    log_overlapping_subnets(&conflicts);
    if let Some(conflict) = conflicts.into_iter().next() {
        return Err(PlanError::Overlap {
            first: conflict.first.name,
            first_cidr: conflict.first.cidr,
            second: conflict.second.name,
            second_cidr: conflict.second.cidr,
        });
    }

    let mut existing_subnets = vpc.existing_subnets.clone();
    existing_subnets.sort_by_key(|s| s.cidr);

    Ok(SubnetPlan {
        vpc_id: vpc.vpc_id.clone(),
        vpc_cidr: vpc.cidr,
        region: config.region.clone(),
        subnets,
        existing_subnets,
    })
}
