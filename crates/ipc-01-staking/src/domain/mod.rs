//! Domain module for the staking subsystem
//!
//! ## Core Modules
//! - priority_queue: indexed min/max heaps over validator addresses
//! - validator: records and permission modes
//! - validator_set: active/waiting membership and reshuffling
//! - change_log: deferred, numbered staking changes
//! - release_queue: time-locked withdrawals

pub mod change_log;
pub mod priority_queue;
pub mod release_queue;
pub mod validator;
pub mod validator_set;

pub use change_log::{StakingChange, StakingChangeLog, StakingOperation, INITIAL_CONFIGURATION_NUMBER};
pub use priority_queue::{HeapOrder, MaxOrder, MaxPQ, MinOrder, MinPQ, PriorityQueue, PriorityQueueError};
pub use release_queue::{StakingRelease, StakingReleaseQueue};
pub use validator::{PermissionMode, ValidatorRecord};
pub use validator_set::ValidatorSet;
