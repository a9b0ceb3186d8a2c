//! Deployment configuration.
//!
//! Account, region, VPC and subnet layout live here instead of being baked
//! into the planning code. Values come from a JSON file, with account and
//! region filled in from the environment when the file leaves them out.

use crate::error::ConfigError;
use crate::models::{ExistingSubnet, Ipv4, SubnetTier};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Config file used when `SUBNET_PLAN_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "subnet_plan.json";
pub const ENV_CONFIG_FILE: &str = "SUBNET_PLAN_CONFIG";
pub const ENV_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
pub const ENV_REGION: &str = "AWS_REGION";

/// Default /mask of the gap rows in the plan report.
pub const GAP_CIDR_MASK: u8 = 24;

static ACCOUNT_REGEX: OnceLock<Regex> = OnceLock::new();
static REGION_REGEX: OnceLock<Regex> = OnceLock::new();
static VPC_ID_REGEX: OnceLock<Regex> = OnceLock::new();
static SUBNET_ID_REGEX: OnceLock<Regex> = OnceLock::new();
static ROUTE_TABLE_ID_REGEX: OnceLock<Regex> = OnceLock::new();
static SECURITY_GROUP_ID_REGEX: OnceLock<Regex> = OnceLock::new();
static ROLE_ARN_REGEX: OnceLock<Regex> = OnceLock::new();

fn account_regex() -> &'static Regex {
    ACCOUNT_REGEX.get_or_init(|| Regex::new(r"^\d{12}$").expect("Invalid Regex"))
}

fn region_regex() -> &'static Regex {
    REGION_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2}(-gov)?-[a-z]+-\d$").expect("Invalid Regex"))
}

fn vpc_id_regex() -> &'static Regex {
    VPC_ID_REGEX.get_or_init(|| Regex::new(r"^vpc-[0-9a-f]{8,17}$").expect("Invalid Regex"))
}

fn subnet_id_regex() -> &'static Regex {
    SUBNET_ID_REGEX.get_or_init(|| Regex::new(r"^subnet-[0-9a-f]{8,17}$").expect("Invalid Regex"))
}

fn route_table_id_regex() -> &'static Regex {
    ROUTE_TABLE_ID_REGEX.get_or_init(|| Regex::new(r"^rtb-[0-9a-f]{8,17}$").expect("Invalid Regex"))
}

fn security_group_id_regex() -> &'static Regex {
    SECURITY_GROUP_ID_REGEX.get_or_init(|| Regex::new(r"^sg-[0-9a-f]{8,17}$").expect("Invalid Regex"))
}

/// Captures the account id of an IAM role ARN.
fn role_arn_regex() -> &'static Regex {
    ROLE_ARN_REGEX
        .get_or_init(|| Regex::new(r"^arn:aws:iam::(\d{12}):role/.+$").expect("Invalid Regex"))
}

/// The VPC the subnets are carved from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VpcConfig {
    /// Existing VPC id, e.g. `vpc-0e9887775f8443b4f`.
    pub vpc_id: String,
    /// VPC address range; must be /16 or longer.
    pub cidr: Ipv4,
    /// Zones subnets may be placed in, addressed by index.
    pub availability_zones: Vec<String>,
    /// Subnets already in the VPC; planned subnets must stay clear of them.
    #[serde(default)]
    pub existing_subnets: Vec<ExistingSubnet>,
    /// Security groups attached to workloads in the VPC.
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

/// One subnet to allocate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubnetConfig {
    pub name: String,
    /// Added to the VPC third octet to pick the /24.
    pub offset: u32,
    /// Index into [`VpcConfig::availability_zones`].
    pub az_index: usize,
    pub tier: SubnetTier,
}

/// Everything the planner needs to know about one deployment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// IAM role the workloads run as.
    #[serde(default)]
    pub main_role_arn: Option<String>,
    pub vpc: VpcConfig,
    pub subnets: Vec<SubnetConfig>,
}

impl Default for DeploymentConfig {
    /// Two private subnets in the first zone and one public subnet in each
    /// of the next two, inside `10.0.0.0/16`. The first three /24s are taken
    /// by the VPC's original public subnets.
    fn default() -> Self {
        let subnet = |name: &str, offset, az_index, tier| SubnetConfig {
            name: name.to_string(),
            offset,
            az_index,
            tier,
        };
        let existing = |subnet_id: &str, third_octet, availability_zone: &str| ExistingSubnet {
            subnet_id: subnet_id.to_string(),
            cidr: Ipv4 {
                addr: std::net::Ipv4Addr::new(10, 0, third_octet, 0),
                mask: 24,
            },
            availability_zone: availability_zone.to_string(),
            route_table_id: Some("rtb-00b8e0f9dab393b4a".to_string()),
        };
        DeploymentConfig {
            account_id: None,
            region: None,
            main_role_arn: None,
            vpc: VpcConfig {
                vpc_id: "vpc-0e9887775f8443b4f".to_string(),
                cidr: Ipv4 {
                    addr: std::net::Ipv4Addr::new(10, 0, 0, 0),
                    mask: 16,
                },
                availability_zones: vec![
                    "us-east-2a".to_string(),
                    "us-east-2b".to_string(),
                    "us-east-2c".to_string(),
                ],
                existing_subnets: vec![
                    existing("subnet-0f7f60a04eee90e0e", 0, "us-east-2a"),
                    existing("subnet-07e9e222ffb54b488", 1, "us-east-2b"),
                    existing("subnet-078b290b2356971fa", 2, "us-east-2c"),
                ],
                security_group_ids: vec![
                    "sg-0c741c7eeb0b1e3fa".to_string(),
                    "sg-0047198913daa5d4c".to_string(),
                ],
            },
            subnets: vec![
                subnet("EKSPrivateSubnetA", 3, 0, SubnetTier::Private),
                subnet("EKSPrivateSubnetB", 4, 0, SubnetTier::Private),
                subnet("EKSPublicSubnetA", 5, 1, SubnetTier::Public),
                subnet("EKSPublicSubnetB", 6, 2, SubnetTier::Public),
            ],
        }
    }
}

impl DeploymentConfig {
    /// Read a config from a JSON file. Parse errors carry the JSON path of
    /// the offending field.
    pub fn load(path: impl AsRef<Path>) -> Result<DeploymentConfig, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Reading config file: {}", path.display());
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<DeploymentConfig, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ConfigError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })
    }

    /// Load `path` if it exists, else fall back to [`DeploymentConfig::default`].
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<DeploymentConfig, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!(
                "Config file not found: {}, using built-in layout",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Fill account and region from `AWS_ACCOUNT_ID` / `AWS_REGION` when the
    /// config leaves them unset.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_ACCOUNT_ID).ok(),
            std::env::var(ENV_REGION).ok(),
        );
    }

    fn apply_overrides(&mut self, account_id: Option<String>, region: Option<String>) {
        let set = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if self.account_id.is_none() {
            self.account_id = set(account_id);
            if self.account_id.is_some() {
                log::debug!("account_id taken from {ENV_ACCOUNT_ID}");
            }
        }
        if self.region.is_none() {
            self.region = set(region);
            if let Some(region) = &self.region {
                log::debug!("region={region} taken from {ENV_REGION}");
            }
        }
    }

    /// Check every field the planner relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: String| ConfigError::InvalidField {
            field: field.to_string(),
            reason,
        };

        if let Some(account_id) = &self.account_id {
            if !account_regex().is_match(account_id) {
                return Err(invalid(
                    "account_id",
                    format!("'{account_id}' is not a 12 digit AWS account id"),
                ));
            }
        }
        if let Some(region) = &self.region {
            if !region_regex().is_match(region) {
                return Err(invalid("region", format!("'{region}' is not an AWS region")));
            }
        }

        let vpc = &self.vpc;
        if !vpc_id_regex().is_match(&vpc.vpc_id) {
            return Err(invalid(
                "vpc.vpc_id",
                format!("'{}' is not a VPC id", vpc.vpc_id),
            ));
        }
        if vpc.cidr.mask < crate::allocator::MIN_BASE_PREFIX {
            return Err(invalid(
                "vpc.cidr",
                format!(
                    "{} is shorter than /{}",
                    vpc.cidr,
                    crate::allocator::MIN_BASE_PREFIX
                ),
            ));
        }
        if !vpc.cidr.is_network_aligned() {
            return Err(invalid(
                "vpc.cidr",
                format!("{} has host bits set, expected {}/{}", vpc.cidr, vpc.cidr.lo(), vpc.cidr.mask),
            ));
        }
        if vpc.availability_zones.is_empty() {
            return Err(invalid(
                "vpc.availability_zones",
                "at least one zone is required".to_string(),
            ));
        }
        if let Some(region) = &self.region {
            let in_region = |az: &str| {
                let mut suffix = match az.strip_prefix(region.as_str()) {
                    Some(suffix) => suffix.chars(),
                    None => return false,
                };
                matches!((suffix.next(), suffix.next()), (Some(c), None) if c.is_ascii_lowercase())
            };
            if let Some(az) = vpc.availability_zones.iter().find(|az| !in_region(az)) {
                return Err(invalid(
                    "vpc.availability_zones",
                    format!("'{az}' is not a zone of region {region}"),
                ));
            }
        }

        for (i, existing) in vpc.existing_subnets.iter().enumerate() {
            let field = |name: &str| format!("vpc.existing_subnets[{i}].{name}");
            if !subnet_id_regex().is_match(&existing.subnet_id) {
                return Err(invalid(
                    &field("subnet_id"),
                    format!("'{}' is not a subnet id", existing.subnet_id),
                ));
            }
            if !vpc.cidr.contains_net(&existing.cidr) {
                return Err(invalid(
                    &field("cidr"),
                    format!("{} is outside VPC {}", existing.cidr, vpc.cidr),
                ));
            }
            if !vpc.availability_zones.contains(&existing.availability_zone) {
                return Err(invalid(
                    &field("availability_zone"),
                    format!("'{}' is not one of the VPC zones", existing.availability_zone),
                ));
            }
            if let Some(route_table_id) = &existing.route_table_id {
                if !route_table_id_regex().is_match(route_table_id) {
                    return Err(invalid(
                        &field("route_table_id"),
                        format!("'{route_table_id}' is not a route table id"),
                    ));
                }
            }
        }
        for (i, sg) in vpc.security_group_ids.iter().enumerate() {
            if !security_group_id_regex().is_match(sg) {
                return Err(invalid(
                    &format!("vpc.security_group_ids[{i}]"),
                    format!("'{sg}' is not a security group id"),
                ));
            }
        }
        if let Some(arn) = &self.main_role_arn {
            let arn_account = role_arn_regex()
                .captures(arn)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            match (arn_account, &self.account_id) {
                (None, _) => {
                    return Err(invalid(
                        "main_role_arn",
                        format!("'{arn}' is not an IAM role ARN"),
                    ))
                }
                (Some(arn_account), Some(account_id)) if arn_account != account_id => {
                    return Err(invalid(
                        "main_role_arn",
                        format!("role belongs to account {arn_account}, not {account_id}"),
                    ))
                }
                _ => {}
            }
        }

        for (i, subnet) in self.subnets.iter().enumerate() {
            if subnet.name.trim().is_empty() {
                return Err(invalid(
                    &format!("subnets[{i}].name"),
                    "name must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DeploymentConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(config.subnets.len(), 4);
        assert_eq!(config.vpc.cidr.to_string(), "10.0.0.0/16");
    }

    #[test]
    fn test_load_test_config() {
        let config = DeploymentConfig::load("src/tests/test_data/subnet_plan_01.json")
            .expect("Error reading config");
        assert_eq!(config.vpc.vpc_id, "vpc-0e9887775f8443b4f");
        assert_eq!(config.subnets.len(), 4);
        assert_eq!(config.subnets[2].tier, SubnetTier::Public);
        assert_eq!(config.vpc.existing_subnets.len(), 3);
        assert_eq!(config.vpc.security_group_ids.len(), 2);
        assert!(config.main_role_arn.is_some());
        config.validate().expect("test config should validate");
    }

    #[test]
    fn test_parse_error_has_path() {
        let json = r#"{"vpc": {"vpc_id": "vpc-0e9887775f8443b4f", "cidr": "10.0.0/16", "availability_zones": []}, "subnets": []}"#;
        match DeploymentConfig::from_json(json) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, "vpc.cidr"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DeploymentConfig::load("src/tests/test_data/does_not_exist.json"),
            Err(ConfigError::Io { .. })
        ));
        let config = DeploymentConfig::load_or_default("src/tests/test_data/does_not_exist.json")
            .expect("fallback to default");
        assert_eq!(config, DeploymentConfig::default());
    }

    #[test]
    fn test_overrides() {
        let mut config = DeploymentConfig::default();
        config.apply_overrides(Some("844062109895".to_string()), Some(" ".to_string()));
        assert_eq!(config.account_id.as_deref(), Some("844062109895"));
        assert_eq!(config.region, None);

        config.apply_overrides(Some("111111111111".to_string()), Some("us-east-2".to_string()));
        assert_eq!(config.account_id.as_deref(), Some("844062109895"));
        assert_eq!(config.region.as_deref(), Some("us-east-2"));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let field_of = |config: &DeploymentConfig| match config.validate() {
            Err(ConfigError::InvalidField { field, .. }) => field,
            other => panic!("expected invalid field, got {other:?}"),
        };

        let mut config = DeploymentConfig::default();
        config.account_id = Some("1234".to_string());
        assert_eq!(field_of(&config), "account_id");

        let mut config = DeploymentConfig::default();
        config.region = Some("mars-1".to_string());
        assert_eq!(field_of(&config), "region");

        let mut config = DeploymentConfig::default();
        config.vpc.vpc_id = "vpc-XYZ".to_string();
        assert_eq!(field_of(&config), "vpc.vpc_id");

        let mut config = DeploymentConfig::default();
        config.vpc.cidr = Ipv4::new("10.0.0.0/8").unwrap();
        assert_eq!(field_of(&config), "vpc.cidr");

        let mut config = DeploymentConfig::default();
        config.vpc.cidr = Ipv4::new("10.0.1.0/16").unwrap();
        assert_eq!(field_of(&config), "vpc.cidr");

        let mut config = DeploymentConfig::default();
        config.region = Some("us-east-2".to_string());
        config.vpc.availability_zones[1] = "eu-west-1b".to_string();
        assert_eq!(field_of(&config), "vpc.availability_zones");

        for az in ["us-east-21", "us-east-2", "us-east-2ab", "us-east-2B"] {
            let mut config = DeploymentConfig::default();
            config.region = Some("us-east-2".to_string());
            config.vpc.availability_zones[2] = az.to_string();
            assert_eq!(field_of(&config), "vpc.availability_zones", "zone {az}");
        }

        let mut config = DeploymentConfig::default();
        config.subnets[3].name = " ".to_string();
        assert_eq!(field_of(&config), "subnets[3].name");
    }

    #[test]
    fn test_validate_existing_resources() {
        let field_of = |config: &DeploymentConfig| match config.validate() {
            Err(ConfigError::InvalidField { field, .. }) => field,
            other => panic!("expected invalid field, got {other:?}"),
        };

        let mut config = DeploymentConfig::default();
        config.vpc.existing_subnets[0].subnet_id = "subnet-XYZ".to_string();
        assert_eq!(field_of(&config), "vpc.existing_subnets[0].subnet_id");

        let mut config = DeploymentConfig::default();
        config.vpc.existing_subnets[1].cidr = Ipv4::new("10.1.1.0/24").unwrap();
        assert_eq!(field_of(&config), "vpc.existing_subnets[1].cidr");

        let mut config = DeploymentConfig::default();
        config.vpc.existing_subnets[2].availability_zone = "us-east-2d".to_string();
        assert_eq!(field_of(&config), "vpc.existing_subnets[2].availability_zone");

        let mut config = DeploymentConfig::default();
        config.vpc.existing_subnets[0].route_table_id = Some("rtb-1".to_string());
        assert_eq!(field_of(&config), "vpc.existing_subnets[0].route_table_id");

        let mut config = DeploymentConfig::default();
        config.vpc.security_group_ids.push("sg-nothex!".to_string());
        assert_eq!(field_of(&config), "vpc.security_group_ids[2]");

        let mut config = DeploymentConfig::default();
        config.main_role_arn = Some("arn:aws:iam::844062109895:user/ci".to_string());
        assert_eq!(field_of(&config), "main_role_arn");

        let mut config = DeploymentConfig::default();
        config.account_id = Some("111111111111".to_string());
        config.main_role_arn = Some("arn:aws:iam::844062109895:role/EKSMainRole".to_string());
        assert_eq!(field_of(&config), "main_role_arn");

        config.account_id = Some("844062109895".to_string());
        config.validate().expect("matching role account should validate");
    }
}
