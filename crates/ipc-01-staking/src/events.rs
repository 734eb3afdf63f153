//! # Staking Events
//!
//! Emitted in operation order. Indexers rebuild the validator set from this
//! stream without re-deriving it.

use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainEpoch, TokenAmount, U256};

use crate::domain::change_log::StakingOperation;

/// Validator set and staking lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingEvent {
    /// A validator entered the active set.
    NewActiveValidator { validator: Address, power: U256 },

    /// A validator entered the waiting set.
    NewWaitingValidator { validator: Address, power: U256 },

    /// `new_validator` took the active slot of `old_validator`, which moved
    /// to the waiting set.
    ActiveValidatorReplaced {
        old_validator: Address,
        new_validator: Address,
    },

    /// An active validator dropped to zero power.
    ActiveValidatorLeft { validator: Address },

    /// A waiting validator dropped to zero power.
    WaitingValidatorLeft { validator: Address },

    /// An active validator's power changed without a membership change.
    ActiveValidatorCollateralUpdated { validator: Address, power: U256 },

    /// A waiting validator's power changed without a membership change.
    WaitingValidatorCollateralUpdated { validator: Address, power: U256 },

    /// A deferred change was recorded.
    NewStakingChangeRequest {
        operation: StakingOperation,
        validator: Address,
        configuration_number: u64,
    },

    /// Every change up to `configuration_number` has been applied.
    ConfigurationNumberConfirmed { configuration_number: u64 },

    /// A withdrawal was locked until `release_at`.
    CollateralReleaseQueued {
        validator: Address,
        amount: TokenAmount,
        release_at: ChainEpoch,
    },

    /// Matured releases were paid out.
    CollateralClaimed { validator: Address, amount: TokenAmount },
}

impl StakingEvent {
    /// Validator the event is about, if any.
    pub fn validator(&self) -> Option<Address> {
        match self {
            Self::NewActiveValidator { validator, .. }
            | Self::NewWaitingValidator { validator, .. }
            | Self::ActiveValidatorLeft { validator }
            | Self::WaitingValidatorLeft { validator }
            | Self::ActiveValidatorCollateralUpdated { validator, .. }
            | Self::WaitingValidatorCollateralUpdated { validator, .. }
            | Self::NewStakingChangeRequest { validator, .. }
            | Self::CollateralReleaseQueued { validator, .. }
            | Self::CollateralClaimed { validator, .. } => Some(*validator),
            Self::ActiveValidatorReplaced { new_validator, .. } => Some(*new_validator),
            Self::ConfigurationNumberConfirmed { .. } => None,
        }
    }
}
