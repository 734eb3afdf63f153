//! # ipc-02-quorum
//!
//! Weighted quorum certification for bottom-up checkpoints and message
//! batches.
//!
//! ## Overview
//!
//! - **QuorumMap**: per-height accumulation of member signatures, each proven
//!   against a Merkle root of `(address, weight)` leaves
//! - **Multisig**: one-shot weighted threshold check for direct submissions
//! - **Pruning**: a monotonic retention height below which quorums are gone
//!
//! ## Threshold
//!
//! `threshold = floor(membership_weight * majority_percentage / 100)`; a quorum
//! is reached once collected weight is at least the threshold and stays
//! reached.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod service;

pub use config::QuorumConfig;
pub use domain::{is_valid_weighted_multisignature, QuorumInfo, QuorumMap};
pub use error::{MultisigError, QuorumError, QuorumResult};
pub use events::QuorumEvent;
pub use ports::inbound::QuorumApi;
pub use service::CertifierService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
