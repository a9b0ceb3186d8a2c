//! Error types for CIDR allocation, configuration and subnet planning.

use crate::models::Ipv4;
use thiserror::Error;

/// Errors returned by the subnet CIDR allocator.
///
/// All of them are caused by malformed input, so none is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    /// Address is not four dot separated numbers, or the prefix is missing,
    /// not a number, below /16 or above /32.
    #[error("Invalid CIDR block '{0}'")]
    InvalidCidrFormat(String),

    /// A numeric octet outside 0-255.
    #[error("Invalid octet '{octet}' in '{input}'")]
    InvalidOctet { octet: String, input: String },

    /// Third octet plus offset does not fit in an octet.
    #[error("Offset {offset} on third octet {third_octet} overflows 255")]
    OctetOverflow { third_octet: u8, offset: u32 },
}

/// Errors loading or validating a [`crate::config::DeploymentConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error reading config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON did not match the config layout, `path` points at the field.
    #[error("Error parsing config JSON: path={path} error={message}")]
    Parse { path: String, message: String },

    #[error("Invalid config field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Errors building a subnet plan. Any of them aborts the plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Subnet '{name}': {source}")]
    Allocation {
        name: String,
        #[source]
        source: CidrError,
    },

    #[error("Subnet '{name}': availability zone index {index} out of range ({available} zones)")]
    AzIndexOutOfRange {
        name: String,
        index: usize,
        available: usize,
    },

    #[error("Subnet '{name}' {cidr} is outside VPC {vpc}")]
    OutsideVpc { name: String, cidr: Ipv4, vpc: Ipv4 },

    #[error("Duplicate subnet name '{0}'")]
    DuplicateName(String),

    #[error("Subnet '{first}' {first_cidr} overlaps '{second}' {second_cidr}")]
    Overlap {
        first: String,
        first_cidr: Ipv4,
        second: String,
        second_cidr: Ipv4,
    },

    #[error("Subnet '{name}' {cidr} overlaps existing {subnet_id} {existing_cidr}")]
    OverlapsExisting {
        name: String,
        cidr: Ipv4,
        subnet_id: String,
        existing_cidr: Ipv4,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
