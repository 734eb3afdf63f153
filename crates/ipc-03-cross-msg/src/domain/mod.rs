//! Domain module for cross-net routing
//!
//! - direction: top-down / bottom-up classification
//! - subnet: registered children and their counters
//! - batch: bottom-up batches per checkpoint epoch
//! - postbox: envelopes awaiting forwarding

pub mod batch;
pub mod direction;
pub mod postbox;
pub mod subnet;

pub use batch::{next_epoch, BatchStore};
pub use direction::{apply_type, is_bottomup, is_lca, is_multilevel, IpcMsgType};
pub use postbox::Postbox;
pub use subnet::{Subnet, SubnetRegistry, SupplyKind};
