//! Ports module (Hexagonal Architecture)

pub mod inbound;

pub use inbound::QuorumApi;
