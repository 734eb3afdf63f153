//! Router configuration.

use serde::{Deserialize, Serialize};
use shared_types::ChainEpoch;

use crate::error::{RouterError, RouterResult};

/// Router parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Blocks between bottom-up checkpoints.
    pub bottom_up_check_period: ChainEpoch,
    /// Envelopes a bottom-up batch holds before it is cut early.
    pub max_msgs_per_batch: usize,
    /// Allow messages more than one hop away from the common ancestor.
    pub multilevel_enabled: bool,
    /// Allow relaying transfers through token-backed subnets.
    pub token_propagation: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bottom_up_check_period: 10,
            max_msgs_per_batch: 10,
            multilevel_enabled: false,
            token_propagation: false,
        }
    }
}

impl RouterConfig {
    /// Short period and tiny batches.
    pub fn for_testing() -> Self {
        Self {
            bottom_up_check_period: 10,
            max_msgs_per_batch: 3,
            multilevel_enabled: false,
            token_propagation: false,
        }
    }

    /// Reject zero period and zero batch size.
    pub fn validate(&self) -> RouterResult<()> {
        if self.bottom_up_check_period == 0 {
            return Err(RouterError::InvalidConfig {
                reason: "bottom_up_check_period must be positive".into(),
            });
        }
        if self.max_msgs_per_batch == 0 {
            return Err(RouterError::InvalidConfig {
                reason: "max_msgs_per_batch must be positive".into(),
            });
        }
        Ok(())
    }
}
