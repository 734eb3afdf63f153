//! # Integration Flows
//!
//! Choreography between a root and a child gateway:
//!
//! ```text
//!   root /r1                                   child /r1/<actor>
//!   ────────                                   ─────────────────
//!   register_subnet, deposit ──┐
//!   fund ──────── top-down ────┼────────────►  apply_top_down_messages
//!                              │               release / receipts
//!   submit_checkpoint ◄──── certified ─────── create_bottom_up_checkpoint
//!   submit_bottom_up_msg_batch ◄──────────── create_bottom_up_batch_quorum
//! ```

pub mod bottom_up;
pub mod checkpoints;
pub mod receipts;
pub mod reentrancy;
pub mod staking_lifecycle;
pub mod top_down;
