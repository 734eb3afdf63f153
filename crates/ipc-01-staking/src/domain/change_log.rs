//! # Staking Change Log
//!
//! Deferred validator-set changes, numbered by a monotonic configuration
//! number. The child subnet adopts changes in order and reports the last
//! one it applied in a checkpoint; only then does the parent confirm them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared_types::{Address, TokenAmount, U256};

/// First configuration number handed out.
pub const INITIAL_CONFIGURATION_NUMBER: u64 = 1;

/// A requested change with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingOperation {
    /// Replace the validator's metadata.
    SetMetadata { metadata: Vec<u8> },
    /// Assign federated power and, if non-empty, metadata.
    SetFederatedPower { metadata: Vec<u8>, power: U256 },
    /// Add collateral.
    Deposit { amount: TokenAmount },
    /// Remove collateral.
    Withdraw { amount: TokenAmount },
}

/// A change waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingChange {
    /// What to do.
    pub operation: StakingOperation,
    /// Validator affected.
    pub validator: Address,
}

/// Changes keyed by configuration number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingChangeLog {
    next_configuration_number: u64,
    start_configuration_number: u64,
    changes: BTreeMap<u64, StakingChange>,
}

impl Default for StakingChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StakingChangeLog {
    /// Empty log starting at [`INITIAL_CONFIGURATION_NUMBER`].
    pub fn new() -> Self {
        Self {
            next_configuration_number: INITIAL_CONFIGURATION_NUMBER,
            start_configuration_number: INITIAL_CONFIGURATION_NUMBER,
            changes: BTreeMap::new(),
        }
    }

    /// Number the next recorded change will get.
    pub fn next_configuration_number(&self) -> u64 {
        self.next_configuration_number
    }

    /// First number not yet confirmed.
    pub fn start_configuration_number(&self) -> u64 {
        self.start_configuration_number
    }

    /// Number of pending changes.
    pub fn pending(&self) -> usize {
        self.changes.len()
    }

    /// Change recorded under `configuration_number`.
    pub fn get(&self, configuration_number: u64) -> Option<&StakingChange> {
        self.changes.get(&configuration_number)
    }

    /// Pending changes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &StakingChange)> {
        self.changes.iter()
    }

    /// Record `change`, returning its configuration number.
    pub fn record_change(&mut self, validator: Address, operation: StakingOperation) -> u64 {
        let number = self.next_configuration_number;
        self.changes.insert(number, StakingChange { operation, validator });
        self.next_configuration_number += 1;
        number
    }

    /// Remove and return the change under `configuration_number`.
    pub fn purge(&mut self, configuration_number: u64) -> Option<StakingChange> {
        self.changes.remove(&configuration_number)
    }

    /// Mark everything up to `configuration_number` as confirmed.
    pub fn set_start(&mut self, configuration_number: u64) {
        self.start_configuration_number = configuration_number;
    }
}
