//! Error types for the staking subsystem

use shared_types::{Address, ArithmeticError, TokenAmount};
use thiserror::Error;

use crate::domain::priority_queue::PriorityQueueError;
use crate::domain::validator::PermissionMode;

/// Staking errors. Every variant aborts the operation with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    /// Deposits and withdrawals must move something
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// Address is not tracked by the validator set
    #[error("Not a validator: {validator}")]
    NotValidator { validator: Address },

    /// Withdrawal exceeds the validator's collateral
    #[error("Not enough collateral: requested {requested}, available {available}")]
    NotEnoughCollateral {
        requested: TokenAmount,
        available: TokenAmount,
    },

    /// Confirmation of a configuration number that was never assigned
    #[error("Cannot confirm future change: requested {requested}, next {next}")]
    FutureConfigurationNumber { requested: u64, next: u64 },

    /// No pending release for the validator
    #[error("Nothing to claim for {validator}")]
    NothingToClaim { validator: Address },

    /// Operation not allowed under the subnet's permission mode
    #[error("{operation} not allowed in {mode:?} mode")]
    PermissionModeMismatch {
        operation: &'static str,
        mode: PermissionMode,
    },

    /// Heap bookkeeping rejected an operation
    #[error("Priority queue error: {0}")]
    PriorityQueue(#[from] PriorityQueueError),

    /// Checked arithmetic failed
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// Configuration rejected
    #[error("Invalid staking config: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type for staking operations
pub type StakingResult<T> = Result<T, StakingError>;
