//! Output formatting for the subnet plan.
//!
//! This module handles formatting and outputting plan data:
//! - [`csv`] - CSV output formatting
//! - [`terminal`] - Terminal output with colors

mod csv;
mod terminal;

pub use csv::plan_print;
pub use terminal::{format_field, plan_summary};
