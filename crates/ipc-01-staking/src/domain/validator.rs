//! Validator records and permission modes.

use serde::{Deserialize, Serialize};
use shared_types::{TokenAmount, U256};

/// How validator power is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    /// Power is confirmed collateral.
    #[default]
    Collateral,
    /// Power is assigned administratively.
    Federated,
    /// Power is collateral, fixed once the subnet bootstraps.
    Static,
}

/// Per-validator bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    /// Collateral including changes not yet confirmed.
    pub total_collateral: TokenAmount,
    /// Collateral confirmed by the child subnet.
    pub confirmed_collateral: TokenAmount,
    /// Power assigned in federated mode.
    pub federated_power: U256,
    /// Opaque metadata, usually the public key.
    pub metadata: Vec<u8>,
}

impl ValidatorRecord {
    /// Power of this record under `mode`.
    pub fn power(&self, mode: PermissionMode) -> U256 {
        match mode {
            PermissionMode::Federated => self.federated_power,
            PermissionMode::Collateral | PermissionMode::Static => self.confirmed_collateral,
        }
    }

    /// Nothing left at stake, confirmed or pending.
    pub fn is_empty(&self) -> bool {
        self.total_collateral.is_zero() && self.confirmed_collateral.is_zero()
    }
}
