//! # Gateway Configuration
//!
//! Aggregates the per-crate configurations with the local network id.
//!
//! ## Config File Format
//!
//! ```toml
//! network = "/r1"
//!
//! [staking]
//! permission_mode = "collateral"
//! active_limit = 100
//! locking_duration = 4320
//!
//! [quorum]
//! majority_percentage = 67
//!
//! [router]
//! bottom_up_check_period = 10
//! max_msgs_per_batch = 10
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `IPC_NETWORK` | `network` |
//! | `IPC_CHECKPOINT_PERIOD` | `router.bottom_up_check_period` |
//! | `IPC_MAJORITY_PERCENTAGE` | `quorum.majority_percentage` |
//! | `IPC_MAX_MSGS_PER_BATCH` | `router.max_msgs_per_batch` |

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ipc_01_staking::StakingConfig;
use ipc_02_quorum::QuorumConfig;
use ipc_03_cross_msg::RouterConfig;
use serde::{Deserialize, Serialize};
use shared_types::{ChainEpoch, SubnetId};
use thiserror::Error;

/// Errors loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// File is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Environment override could not be parsed
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// A section failed validation
    #[error("Invalid {section} configuration: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

/// Complete gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Local network.
    #[serde(with = "subnet_str")]
    pub network: SubnetId,
    /// Validator sets of child subnets.
    pub staking: StakingConfig,
    /// Checkpoint certification.
    pub quorum: QuorumConfig,
    /// Cross-net routing.
    pub router: RouterConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            network: SubnetId::new_root(1),
            staking: StakingConfig::default(),
            quorum: QuorumConfig::default(),
            router: RouterConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Test configuration for `network`.
    pub fn for_testing(network: SubnetId) -> Self {
        Self {
            network,
            staking: StakingConfig::for_testing(),
            quorum: QuorumConfig::for_testing(),
            router: RouterConfig::for_testing(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, apply environment overrides and validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `IPC_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| env::var(var).ok())
    }

    /// Apply overrides from `lookup`, keyed by variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("IPC_NETWORK") {
            self.network = parse_var("IPC_NETWORK", &value)?;
        }
        if let Some(value) = lookup("IPC_CHECKPOINT_PERIOD") {
            self.router.bottom_up_check_period =
                parse_var::<ChainEpoch>("IPC_CHECKPOINT_PERIOD", &value)?;
        }
        if let Some(value) = lookup("IPC_MAJORITY_PERCENTAGE") {
            self.quorum.majority_percentage = parse_var("IPC_MAJORITY_PERCENTAGE", &value)?;
        }
        if let Some(value) = lookup("IPC_MAX_MSGS_PER_BATCH") {
            self.router.max_msgs_per_batch = parse_var("IPC_MAX_MSGS_PER_BATCH", &value)?;
        }
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.is_empty() {
            return Err(ConfigError::Invalid {
                section: "network",
                reason: "network must not be empty".into(),
            });
        }
        self.staking.validate().map_err(|e| ConfigError::Invalid {
            section: "staking",
            reason: e.to_string(),
        })?;
        self.quorum.validate().map_err(|e| ConfigError::Invalid {
            section: "quorum",
            reason: e.to_string(),
        })?;
        self.router.validate().map_err(|e| ConfigError::Invalid {
            section: "router",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Subnet ids as their `/r<root>/<actor>...` string form.
pub(crate) mod subnet_str {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use shared_types::SubnetId;

    pub fn serialize<S: Serializer>(id: &SubnetId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SubnetId, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipc_01_staking::PermissionMode;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE: &str = r#"
network = "/r7"

[staking]
permission_mode = "federated"
active_limit = 4

[quorum]
majority_percentage = 75

[router]
bottom_up_check_period = 5
"#;

    #[test]
    fn test_default_is_valid() {
        assert!(GatewayConfig::default().validate().is_ok());
        assert!(GatewayConfig::for_testing(SubnetId::new_root(3))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let config = GatewayConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.network, SubnetId::new_root(7));
        assert_eq!(config.staking.permission_mode, PermissionMode::Federated);
        assert_eq!(config.staking.active_limit, 4);
        assert_eq!(
            config.staking.locking_duration,
            StakingConfig::default().locking_duration
        );
        assert_eq!(config.quorum.majority_percentage, 75);
        assert_eq!(config.router.bottom_up_check_period, 5);
        assert_eq!(config.router.max_msgs_per_batch, 10);
    }

    #[test]
    fn test_parse_rejects_bad_network() {
        let result = GatewayConfig::from_toml_str("network = \"r1\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_rejects_minority() {
        let result = GatewayConfig::from_toml_str("[quorum]\nmajority_percentage = 50\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                section: "quorum",
                ..
            })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("IPC_NETWORK", "/r9"),
            ("IPC_CHECKPOINT_PERIOD", "20"),
            ("IPC_MAJORITY_PERCENTAGE", "80"),
            ("IPC_MAX_MSGS_PER_BATCH", "50"),
        ]
        .into_iter()
        .collect();

        let mut config = GatewayConfig::default();
        config
            .apply_overrides(|var| vars.get(var).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.network, SubnetId::new_root(9));
        assert_eq!(config.router.bottom_up_check_period, 20);
        assert_eq!(config.quorum.majority_percentage, 80);
        assert_eq!(config.router.max_msgs_per_batch, 50);
    }

    #[test]
    fn test_override_parse_error() {
        let mut config = GatewayConfig::default();
        let result = config.apply_overrides(|var| {
            (var == "IPC_CHECKPOINT_PERIOD").then(|| "ten".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                var: "IPC_CHECKPOINT_PERIOD",
                ..
            })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = GatewayConfig::load(file.path()).unwrap();
        assert_eq!(config.staking.active_limit, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result = GatewayConfig::load("/nonexistent/ipc-gateway.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_toml_round_trip_keeps_network_string() {
        let config = GatewayConfig::for_testing(SubnetId::new_root(5));
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("network = \"/r5\""));
    }
}
