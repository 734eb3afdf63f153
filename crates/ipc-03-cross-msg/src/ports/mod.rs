//! Ports module (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::{ApplyOutcome, Committed, CrossMsgApi};
pub use outbound::{
    ExecutionEnv, HandlerError, HandlerRegistry, MessageHandler, SupplyError, SupplySource,
};
