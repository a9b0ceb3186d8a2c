//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::processing::SubnetPlan;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// One line summary of a plan, with free offsets the allocator can still use.
pub fn plan_summary(plan: &SubnetPlan, free_offsets: &[u32]) -> String {
    let free = free_offsets
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<String>>()
        .join(",");
    format!(
        "{} {} subnets in {} ({}), next free offsets: [{}]",
        "PLAN".on_green(),
        plan.subnets.len(),
        plan.vpc_id,
        plan.vpc_cidr,
        free
    )
}
