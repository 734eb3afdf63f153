//! # Shared Types Crate
//!
//! Value types shared by the staking, quorum, cross-net and gateway crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type crossing a crate boundary lives here.
//! - **Checked Arithmetic**: token math goes through [`checked_add`],
//!   [`checked_sub`] and [`weighted_threshold`], failing with
//!   [`ArithmeticError`] instead of wrapping.
//! - **Content Addressing**: envelopes, checkpoints and batches hash their
//!   canonical encoding with Keccak-256.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod cross;
pub mod errors;
pub mod primitives;
pub mod subnet_id;

pub use checkpoint::{BottomUpCheckpoint, BottomUpMsgBatch, QuorumObjKind};
pub use cross::{
    encode, is_sorted_by_nonce, InvalidXnetMessageReason, IpcAddress, IpcEnvelope, IpcMsgKind,
    OutcomeType, ResultMsg,
};
pub use errors::{ArithmeticError, EncodingError, ParseError};
pub use primitives::{
    checked_add, checked_sub, weighted_threshold, Address, ChainEpoch, Hash, TokenAmount, U256,
};
pub use subnet_id::SubnetId;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
