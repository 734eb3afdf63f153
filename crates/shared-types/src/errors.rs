//! # Error Types
//!
//! Errors shared by every IPC crate.

use thiserror::Error;

/// Checked arithmetic failures. Never silently wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// Addition or multiplication exceeded the type's range.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Subtraction went below zero.
    #[error("Arithmetic underflow")]
    Underflow,
}

/// Errors parsing textual identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed hex address.
    #[error("Invalid address {input}: {reason}")]
    InvalidAddress { input: String, reason: String },

    /// Malformed subnet path.
    #[error("Invalid subnet id {input}: {reason}")]
    InvalidSubnetId { input: String, reason: String },
}

/// Errors encoding values for hashing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Serialization failed.
    #[error("Encoding failed: {0}")]
    Serialization(String),
}
