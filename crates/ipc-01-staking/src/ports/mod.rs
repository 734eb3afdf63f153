//! Ports module (Hexagonal Architecture)
//!
//! Staking has no outbound dependencies: payouts are returned to the caller,
//! which moves the funds through its own supply source.

pub mod inbound;

pub use inbound::StakingApi;
