//! # Shared Crypto - IPC Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Digests, address derivation |
//! | `ecdsa` | secp256k1, recoverable | Checkpoint and batch signatures |
//! | `merkle` | Sorted-pair Keccak tree | Validator membership snapshots |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Membership leaves**: double-hashed, so a leaf can never be confused
//!   with an internal node

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod merkle;

// Re-exports
pub use ecdsa::{address_from_pubkey, recover_address, Secp256k1KeyPair, SIGNATURE_LENGTH};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, KeccakHasher};
pub use merkle::{hash_pair, membership_leaf, process_proof, verify_proof, MembershipTree};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
