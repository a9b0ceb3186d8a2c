//! Gap finding between planned subnets.
//!
//! Identifies unused address ranges inside the VPC and the /24 offsets that
//! are still free for the allocator. Existing subnets count as taken.

use super::plan::SubnetPlan;
use crate::allocator::subnet_ipv4;
use crate::models::{lo_mask, num_aws_hosts, ExistingSubnet, Ipv4, PlannedSubnet, MAX_LENGTH};
use std::net::Ipv4Addr;

/// Represents a row of the plan report, either a subnet or a gap.
#[derive(Debug)]
pub struct PlanPrintRow {
    /// Row index (0 for gap and existing rows).
    pub j: usize,
    /// `-gap-`, `exists` or the subnet offset.
    pub gap: String,
    pub subnet_cidr: String,
    pub broadcast: String,
    /// Usable AWS hosts, 0 for blocks AWS would not accept as a subnet.
    pub aws_hosts: u64,
    pub subnet_name: String,
    pub tier: String,
    pub availability_zone: String,
    pub vpc_cidr: String,
    pub vpc_id: String,
}

/// Largest aligned free blocks inside `vpc` not covered by `occupied`.
///
/// No block is bigger than `/start_mask`. CIDRs outside the VPC are ignored.
pub fn find_gaps(vpc: Ipv4, occupied: &[Ipv4], start_mask: u8) -> Vec<Ipv4> {
    let mut cidrs: Vec<Ipv4> = occupied
        .iter()
        .copied()
        .filter(|c| vpc.contains_net(c))
        .collect();
    cidrs.sort();

    let mut gaps = Vec::new();
    let mut next = u32::from(vpc.lo()) as u64;
    for cidr in cidrs {
        let lo = u32::from(cidr.lo()) as u64;
        if next < lo {
            fill_gap(next, lo - 1, start_mask, &mut gaps);
        }
        next = next.max(u32::from(cidr.hi()) as u64 + 1);
    }
    let last = u32::from(vpc.hi()) as u64;
    if next <= last {
        fill_gap(next, last, start_mask, &mut gaps);
    }
    gaps
}

/// Cover `[next, last]` with aligned blocks, biggest first.
fn fill_gap(mut next: u64, last: u64, start_mask: u8, gaps: &mut Vec<Ipv4>) {
    while next <= last {
        let start_ip = Ipv4Addr::from(next as u32);
        let mask = find_biggest_subnet(start_ip, start_mask, Ipv4Addr::from(last as u32));
        let gap = Ipv4 {
            addr: start_ip,
            mask,
        };
        gaps.push(gap);
        next = u32::from(gap.hi()) as u64 + 1;
    }
}

/// Find the biggest subnet starting at `start_ip` that ends at or before `last`.
///
/// The returned mask is constrained by:
/// 1. The `start_mask` parameter (won't return a smaller mask)
/// 2. The IP alignment - `start_ip` must be a valid network address for the mask
/// 3. The subnet must not reach past `last`
fn find_biggest_subnet(start_ip: Ipv4Addr, start_mask: u8, last: Ipv4Addr) -> u8 {
    let mut next_mask = start_mask.min(MAX_LENGTH).max(lo_mask(start_ip));
    loop {
        let next_subnet = Ipv4 {
            addr: start_ip,
            mask: next_mask,
        };
        if next_mask < MAX_LENGTH && next_subnet.hi() > last {
            next_mask += 1;
        } else {
            break;
        }
    }
    next_mask
}

/// First `count` offsets whose /24 fits in the VPC and touches no occupied CIDR.
pub fn free_offsets(vpc: Ipv4, occupied: &[Ipv4], count: usize) -> Vec<u32> {
    (0u32..=255)
        .filter_map(|offset| subnet_ipv4(vpc, offset).ok().map(|cidr| (offset, cidr)))
        .filter(|(_, cidr)| vpc.contains_net(cidr))
        .filter(|(_, cidr)| !occupied.iter().any(|taken| taken.overlaps(cidr)))
        .map(|(offset, _)| offset)
        .take(count)
        .collect()
}

/// Merge planned subnets, existing subnets and the gaps between them into
/// report rows.
pub fn plan_rows(plan: &SubnetPlan, gap_cidr_mask: u8) -> Vec<PlanPrintRow> {
    let gaps = find_gaps(plan.vpc_cidr, &plan.occupied_cidrs(), gap_cidr_mask);
    log::debug!(
        "plan_rows() {} subnets, {} existing, {} gaps in {}",
        plan.subnets.len(),
        plan.existing_subnets.len(),
        gaps.len(),
        plan.vpc_cidr
    );

    let mut rows: Vec<(Ipv4, PlanPrintRow)> = gaps
        .into_iter()
        .map(|gap| (gap, gap_row(plan, gap)))
        .collect();
    rows.extend(
        plan.subnets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.cidr, subnet_row(plan, s, i))),
    );
    rows.extend(
        plan.existing_subnets
            .iter()
            .map(|e| (e.cidr, existing_row(plan, e))),
    );
    rows.sort_by_key(|(cidr, _)| *cidr);
    rows.into_iter().map(|(_, row)| row).collect()
}

fn gap_row(plan: &SubnetPlan, gap: Ipv4) -> PlanPrintRow {
    PlanPrintRow {
        j: 0,
        gap: "-gap-".to_string(),
        subnet_cidr: gap.to_string(),
        broadcast: gap.hi().to_string(),
        aws_hosts: num_aws_hosts(gap.mask).unwrap_or(0),
        subnet_name: "None".to_string(),
        tier: "None".to_string(),
        availability_zone: "None".to_string(),
        vpc_cidr: plan.vpc_cidr.to_string(),
        vpc_id: plan.vpc_id.clone(),
    }
}

fn existing_row(plan: &SubnetPlan, e: &ExistingSubnet) -> PlanPrintRow {
    PlanPrintRow {
        j: 0,
        gap: "exists".to_string(),
        subnet_cidr: e.cidr.to_string(),
        broadcast: e.cidr.hi().to_string(),
        aws_hosts: num_aws_hosts(e.cidr.mask).unwrap_or(0),
        subnet_name: e.subnet_id.clone(),
        tier: "existing".to_string(),
        availability_zone: e.availability_zone.clone(),
        vpc_cidr: plan.vpc_cidr.to_string(),
        vpc_id: plan.vpc_id.clone(),
    }
}

fn subnet_row(plan: &SubnetPlan, s: &PlannedSubnet, i: usize) -> PlanPrintRow {
    PlanPrintRow {
        j: i + 1,
        gap: format!("+{}", s.offset),
        subnet_cidr: s.cidr.to_string(),
        broadcast: s.cidr.hi().to_string(),
        aws_hosts: num_aws_hosts(s.cidr.mask).unwrap_or(0),
        subnet_name: s.name.clone(),
        tier: s.tier.to_string(),
        availability_zone: s.availability_zone.clone(),
        vpc_cidr: plan.vpc_cidr.to_string(),
        vpc_id: plan.vpc_id.clone(),
    }
}
