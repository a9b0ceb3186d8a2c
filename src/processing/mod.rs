//! Subnet plan processing logic.
//!
//! This module contains the planning logic built on the allocator:
//! - [`plan`] - Allocation and checks for every configured subnet
//! - [`overlap`] - Overlapping subnet detection
//! - [`gap_finder`] - Free ranges and offsets inside the VPC
//! - [`az`] - Availability zone aggregation

mod az;
mod gap_finder;
mod overlap;
mod plan;

// Re-export public functions
pub use az::{get_az_layout, print_az_layout};
pub use gap_finder::{find_gaps, free_offsets, plan_rows, PlanPrintRow};
pub use overlap::{find_overlapping_subnets, log_overlapping_subnets, OverlapConflict};
pub use plan::{build_subnet_plan, SubnetPlan};
