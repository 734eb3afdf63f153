//! # ipc-03-cross-msg
//!
//! Cross-subnet message routing for one network of the hierarchy.
//!
//! ## Overview
//!
//! - **Commit**: outgoing envelopes get a per-direction nonce; top-down ones
//!   are stored per child, bottom-up ones go into checkpoint batches
//! - **Apply**: arriving envelopes are nonce-checked, executed locally or
//!   parked in the postbox when the destination lies further away
//! - **Receipts**: every `Call` is answered with a `Result`; rejected
//!   transfers and calls get a `SystemErr` receipt that refunds the value
//!
//! ## Routing
//!
//! ```text
//!                    /r1  (lowest common ancestor)
//!                  ▲     │
//!        bottom-up │     │ top-down
//!                  │     ▼
//!             /r1/A       /r1/B
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ipc_03_cross_msg::{MessageRouter, RouterConfig, SupplyKind};
//!
//! let mut router = MessageRouter::new(network, RouterConfig::default())?;
//! router.register_subnet(child.clone(), SupplyKind::Native, stake, height)?;
//! let committed = router.fund(&child, alice, bob, value, height, &mut env)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod ports;
pub mod service;

pub use config::RouterConfig;
pub use domain::{
    apply_type, is_bottomup, is_lca, is_multilevel, next_epoch, BatchStore, IpcMsgType, Postbox,
    Subnet, SubnetRegistry, SupplyKind,
};
pub use error::{RouterError, RouterResult};
pub use events::RouterEvent;
pub use ports::{
    ApplyOutcome, Committed, CrossMsgApi, ExecutionEnv, HandlerError, HandlerRegistry,
    MessageHandler, SupplyError, SupplySource,
};
pub use service::MessageRouter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
