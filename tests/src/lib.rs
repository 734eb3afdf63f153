//! # IPC Test Suite
//!
//! Cross-crate flows between a root network and one child subnet, each
//! served by its own [`ipc_gateway::Gateway`]. The relayer between them is
//! simulated by [`fixtures::Hierarchy`].
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Keys, two-level hierarchy, relayer
//! └── integration/       # Cross-crate choreography
//!     ├── staking_lifecycle.rs
//!     ├── checkpoints.rs
//!     ├── top_down.rs
//!     ├── bottom_up.rs
//!     ├── receipts.rs
//!     └── reentrancy.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ipc-tests
//! cargo test -p ipc-tests integration::receipts
//! cargo bench -p ipc-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
