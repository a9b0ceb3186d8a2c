//! Overlapping subnet CIDR detection.

use crate::models::PlannedSubnet;
use itertools::Itertools;

/// Two planned subnets whose address ranges intersect.
#[derive(Debug, Clone)]
pub struct OverlapConflict {
    pub first: PlannedSubnet,
    pub second: PlannedSubnet,
}

/// Find every overlapping pair of subnets.
///
/// Pairs come out in input order, so a CIDR sorted input gives CIDR sorted
/// conflicts.
pub fn find_overlapping_subnets(subnets: &[PlannedSubnet]) -> Vec<OverlapConflict> {
    subnets
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.cidr.overlaps(&b.cidr))
        .map(|(a, b)| OverlapConflict {
            first: a.clone(),
            second: b.clone(),
        })
        .collect()
}

/// Log overlapping subnet conflicts as warnings.
pub fn log_overlapping_subnets(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping subnet CIDRs found.");
        return;
    }

    log::warn!("Found {} overlapping subnet pair(s):", conflicts.len());
    for conflict in conflicts {
        log::warn!(
            "  '{}' {} ({}) overlaps '{}' {} ({})",
            conflict.first.name,
            conflict.first.cidr,
            conflict.first.availability_zone,
            conflict.second.name,
            conflict.second.cidr,
            conflict.second.availability_zone
        );
    }
}
