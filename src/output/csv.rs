//! CSV output formatting for the subnet plan.

use crate::processing::{plan_rows, PlanPrintRow, SubnetPlan};
use colored::Colorize;
use std::error::Error;

use super::terminal::format_field;

/// Column header of the plan table.
const HEADER: &str = r#" "cnt",   "gap",     "subnet_cidr",      "hosts",          "broadcast",            "subnet_name",    "tier",    "availability_zone",      "vpc_cidr",                   "vpc_id""#;

/// Print the subnet plan as CSV to stdout.
///
/// # Arguments
/// * `plan` - The checked subnet plan
/// * `gap_cidr_mask` - Largest block size reported for unused ranges
pub fn plan_print(plan: &SubnetPlan, gap_cidr_mask: u8) -> Result<(), Box<dyn Error>> {
    log::info!(
        "#Start plan_print() add gap subnets with mask /{}",
        gap_cidr_mask
    );

    println!(
        "# {} {} {} generated {}",
        plan.vpc_id.on_blue(),
        plan.vpc_cidr,
        plan.region.as_deref().unwrap_or("no-region"),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%SZ")
    );
    println!("{HEADER}");

    let rows = plan_rows(plan, gap_cidr_mask);
    for row in &rows {
        println!("{}", csv_row(row));
    }

    log::info!(
        "# {} rows, {} subnets",
        rows.len(),
        rows.iter().filter(|r| r.j > 0).count()
    );
    Ok(())
}

/// Format a single CSV row.
fn csv_row(row: &PlanPrintRow) -> String {
    format!(
        r#"{j},{gap},{subnet_cidr},{hosts},{broadcast},{subnet_name},{tier},{availability_zone},{vpc_cidr},{vpc_id}"#,
        j = format_field(row.j, 6),
        gap = format_field(&row.gap, 8),
        subnet_cidr = format_field(&row.subnet_cidr, 18),
        hosts = format_field(format!("{}_hosts", row.aws_hosts), 12),
        broadcast = format_field(format!("{}_br", row.broadcast), 19),
        subnet_name = format_field(&row.subnet_name, 24),
        tier = format_field(&row.tier, 9),
        availability_zone = format_field(&row.availability_zone, 20),
        vpc_cidr = format_field(format!("{}_vpc", row.vpc_cidr), 24),
        vpc_id = format_field(&row.vpc_id, 24),
    )
}
