//! Staking configuration.

use serde::{Deserialize, Serialize};
use shared_types::{ChainEpoch, TokenAmount};

use crate::domain::PermissionMode;
use crate::error::{StakingError, StakingResult};

/// Parameters of a subnet's validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// How power is derived.
    pub permission_mode: PermissionMode,
    /// Maximum active validators.
    pub active_limit: u16,
    /// Blocks a confirmed withdrawal stays locked.
    pub locking_duration: ChainEpoch,
    /// Confirmed collateral needed before the subnet bootstraps.
    pub min_collateral: TokenAmount,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            permission_mode: PermissionMode::Collateral,
            active_limit: 100,
            locking_duration: 4_320,
            min_collateral: TokenAmount::from(1_000u64),
        }
    }
}

impl StakingConfig {
    /// Small set with short locks.
    pub fn for_testing() -> Self {
        Self {
            permission_mode: PermissionMode::Collateral,
            active_limit: 3,
            locking_duration: 10,
            min_collateral: TokenAmount::from(100u64),
        }
    }

    /// Reject limits that would leave the active set unusable.
    pub fn validate(&self) -> StakingResult<()> {
        if self.active_limit == 0 {
            return Err(StakingError::InvalidConfig {
                reason: "active_limit must be at least 1".into(),
            });
        }
        if self.min_collateral.is_zero() {
            return Err(StakingError::InvalidConfig {
                reason: "min_collateral must be positive".into(),
            });
        }
        Ok(())
    }
}
