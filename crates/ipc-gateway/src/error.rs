//! Gateway errors.

use ipc_01_staking::StakingError;
use ipc_02_quorum::{MultisigError, QuorumError};
use ipc_03_cross_msg::{RouterError, SupplyError};
use shared_types::{Address, ArithmeticError, ChainEpoch, EncodingError, SubnetId};
use thiserror::Error;

use crate::config::ConfigError;

/// Every failure a gateway operation can abort with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Nested call on a surface that is already executing
    #[error("Reentrant call on {surface}")]
    Reentrancy { surface: &'static str },

    /// No subnet actor for the id
    #[error("Subnet {subnet} has no actor on this gateway")]
    SubnetNotFound { subnet: SubnetId },

    /// Checkpoint is not the next one in sequence
    #[error("Invalid checkpoint height: expected {expected}, got {got}")]
    InvalidCheckpointHeight {
        expected: ChainEpoch,
        got: ChainEpoch,
    },

    /// Checkpoint or batch carries more messages than allowed
    #[error("Too many messages: {count} > {max}")]
    TooManyMessages { count: usize, max: usize },

    /// Batch is empty or already superseded
    #[error("Invalid bottom-up batch at height {height}: {reason}")]
    InvalidBatch {
        height: ChainEpoch,
        reason: &'static str,
    },

    /// Checkpoint quorum requested off a period boundary
    #[error("Height {height} is not a checkpoint boundary (period {period})")]
    NotCheckpointHeight {
        height: ChainEpoch,
        period: ChainEpoch,
    },

    /// No stored object at the height
    #[error("No {kind} at height {height}")]
    ObjectNotFound {
        kind: &'static str,
        height: ChainEpoch,
    },

    /// Signer is not in the active validator set
    #[error("Signer {signer} is not an active validator")]
    NotActiveValidator { signer: Address },

    /// Signer appears twice in a submission
    #[error("Duplicate signer {signer}")]
    DuplicateSigner { signer: Address },

    /// Operation needs a bootstrapped subnet
    #[error("Subnet {subnet} has not bootstrapped")]
    NotBootstrapped { subnet: SubnetId },

    /// Subnet still has validators
    #[error("Subnet {subnet} still has {validators} validators")]
    SubnetHasValidators { subnet: SubnetId, validators: usize },

    /// Command could not be decoded
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Staking failure
    #[error(transparent)]
    Staking(#[from] StakingError),

    /// Quorum failure
    #[error(transparent)]
    Quorum(#[from] QuorumError),

    /// Multisignature check failure
    #[error(transparent)]
    Multisig(#[from] MultisigError),

    /// Routing failure
    #[error(transparent)]
    Router(#[from] RouterError),

    /// Value movement failure
    #[error(transparent)]
    Supply(#[from] SupplyError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Hashing input could not be encoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Checked arithmetic failed
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
