//! Domain module for quorum certification
//!
//! - quorum: incremental per-height signature accumulation
//! - multisig: one-shot weighted multisignature check

pub mod multisig;
pub mod quorum;

pub use multisig::is_valid_weighted_multisignature;
pub use quorum::{QuorumInfo, QuorumMap};
