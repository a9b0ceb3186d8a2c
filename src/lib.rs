//! Subnet layout planning for an AWS VPC.
//!
//! The core is [`allocator::subnet_cidr`], which carves /24 subnets out of a
//! VPC CIDR by third octet offset. Around it sit the deployment config, the
//! plan checks and the report output.

pub mod allocator;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

use config::DeploymentConfig;
use processing::SubnetPlan;
use std::error::Error;
use std::path::Path;

pub use allocator::{subnet_cidr, subnet_ipv4};
pub use error::{CidrError, ConfigError, PlanError};

/// Load the deployment config and apply environment overrides.
///
/// A `config_file` argument or a non-empty `SUBNET_PLAN_CONFIG` must name an
/// existing file. Without either, `subnet_plan.json` is used when present,
/// else the built-in layout.
pub fn load_config(config_file: Option<&str>) -> Result<DeploymentConfig, Box<dyn Error>> {
    let env_file = std::env::var(config::ENV_CONFIG_FILE)
        .ok()
        .filter(|file| !file.trim().is_empty());
    load_config_from(config_file, env_file.as_deref())
}

fn load_config_from(
    config_file: Option<&str>,
    env_file: Option<&str>,
) -> Result<DeploymentConfig, Box<dyn Error>> {
    let mut config = match config_file.or(env_file) {
        Some(file) => {
            if !Path::new(file).exists() {
                return Err(format!("Config file does not exist: {file}").into());
            }
            log::info!("Using provided config file: {file}");
            DeploymentConfig::load(file)?
        }
        None => DeploymentConfig::load_or_default(config::DEFAULT_CONFIG_FILE)?,
    };
    config.apply_env();
    Ok(config)
}

/// Load the config and build the checked subnet plan.
pub fn get_subnet_plan(config_file: Option<&str>) -> Result<SubnetPlan, Box<dyn Error>> {
    let config = load_config(config_file)?;
    let plan = processing::build_subnet_plan(&config)?;
    Ok(plan)
}
