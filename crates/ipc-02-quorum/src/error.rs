//! Error types for quorum certification

use shared_crypto::CryptoError;
use shared_types::{Address, ArithmeticError, ChainEpoch, TokenAmount};
use thiserror::Error;

/// Errors raised by a [`QuorumMap`](crate::domain::QuorumMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumError {
    /// Height already pruned
    #[error("Quorum at height {height} already processed (retention height {retention_height})")]
    QuorumAlreadyProcessed {
        height: ChainEpoch,
        retention_height: ChainEpoch,
    },

    /// Membership carries no weight
    #[error("Membership weight is zero at height {height}")]
    ZeroMembershipWeight { height: ChainEpoch },

    /// Height already has a quorum
    #[error("Quorum already exists at height {height}")]
    QuorumAlreadyExists { height: ChainEpoch },

    /// No quorum at height
    #[error("Quorum not found at height {height}")]
    QuorumNotFound { height: ChainEpoch },

    /// Signer could not be recovered
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    /// Signer already counted at height
    #[error("Signature replay by {signer} at height {height}")]
    SignatureReplay { height: ChainEpoch, signer: Address },

    /// Signer and weight not in the membership
    #[error("Signer {signer} with weight {weight} is not in the membership at height {height}")]
    NotAuthorized {
        height: ChainEpoch,
        signer: Address,
        weight: TokenAmount,
    },

    /// Retention height must move forward
    #[error("Invalid retention height {requested}, current {current}")]
    InvalidRetentionHeight {
        requested: ChainEpoch,
        current: ChainEpoch,
    },

    /// Majority percentage outside 51..=100
    #[error("Invalid majority percentage: {percentage}")]
    InvalidMajorityPercentage { percentage: u8 },

    /// Checked arithmetic failed
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Errors raised by the one-shot multisig check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultisigError {
    /// Nothing to verify
    #[error("No signatures")]
    EmptySignatures,

    /// Input slices differ in length
    #[error("Length mismatch: {signers} signers, {weights} weights, {signatures} signatures")]
    LengthMismatch {
        signers: usize,
        weights: usize,
        signatures: usize,
    },

    /// Signature at index could not be recovered
    #[error("Invalid signature at index {index}: {source}")]
    InvalidSignature { index: usize, source: CryptoError },

    /// Recovered address differs from the declared signer
    #[error("Invalid signatory at index {index}: expected {expected}, recovered {recovered}")]
    InvalidSignatory {
        index: usize,
        expected: Address,
        recovered: Address,
    },

    /// Accumulated weight below threshold
    #[error("Weights below threshold: {weight} < {threshold}")]
    WeightsBelowThreshold {
        weight: TokenAmount,
        threshold: TokenAmount,
    },

    /// Checked arithmetic failed
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Result alias for quorum operations.
pub type QuorumResult<T> = Result<T, QuorumError>;
