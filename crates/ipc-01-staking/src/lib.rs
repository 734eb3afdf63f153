//! # ipc-01-staking
//!
//! Validator membership of a child subnet.
//!
//! ## Overview
//!
//! - **Validator set**: bounded active set (min-heap) backed by an unbounded
//!   waiting set (max-heap), reshuffled on every confirmed power change
//! - **Change log**: numbered, deferred staking requests confirmed in order
//! - **Release queue**: withdrawn collateral locked for a fixed number of blocks
//!
//! ## Flow
//!
//! ```text
//! deposit / withdraw / set_federated_power / set_metadata
//!        │
//!        ▼
//! StakingChangeLog ──confirm_change(n)──→ ValidatorSet ──→ StakingEvent
//!                                             │
//!                                             └── withdraw ──→ StakingReleaseQueue ──claim──→ payout
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ipc_01_staking::{StakingApi, StakingConfig, StakingService};
//!
//! let mut staking = StakingService::new(StakingConfig::default())?;
//! let n = staking.deposit(validator, amount)?;
//! staking.confirm_change(n, height)?;
//! assert!(staking.validators().is_active(&validator));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod service;

pub use config::StakingConfig;
pub use domain::{
    MaxPQ, MinPQ, PermissionMode, PriorityQueue, PriorityQueueError, StakingChange,
    StakingChangeLog, StakingOperation, StakingRelease, StakingReleaseQueue, ValidatorRecord,
    ValidatorSet, INITIAL_CONFIGURATION_NUMBER,
};
pub use error::{StakingError, StakingResult};
pub use events::StakingEvent;
pub use ports::inbound::StakingApi;
pub use service::StakingService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
