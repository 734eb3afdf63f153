//! # Adapter Implementations
//!
//! Concrete outbound ports for the router: in-memory ledgers per supply
//! kind and the execution environment handed to every routing call.
//!
//! ```text
//! MessageRouter ──ExecutionEnv──→ GatewayEnv ──┬─→ Ledgers (NativeLedger, TokenLedger)
//!                                              └─→ HandlerRegistry
//! ```

pub mod env;
pub mod ledger;

pub use env::GatewayEnv;
pub use ledger::{Ledgers, NativeLedger, TokenLedger};
