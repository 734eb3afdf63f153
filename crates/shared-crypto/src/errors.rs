//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature is not 65 bytes of r || s || v
    #[error("Invalid signature length: expected 65, got {actual}")]
    InvalidSignatureLength {
        /// Actual length in bytes
        actual: usize,
    },

    /// Recovery id byte is not 0, 1, 27 or 28
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// r or s are out of range
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// No public key could be recovered from the signature
    #[error("Public key recovery failed")]
    RecoveryFailed,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Merkle tree built with no leaves
    #[error("Expected non-zero number of leaves")]
    EmptyTree,

    /// Leaf index outside the tree
    #[error("Leaf index {index} is not in tree of {leaves} leaves")]
    LeafOutOfRange {
        /// Requested index
        index: usize,
        /// Number of leaves
        leaves: usize,
    },
}
