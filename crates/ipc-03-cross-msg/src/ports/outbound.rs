//! # Outbound Ports
//!
//! Collaborators the router calls while executing envelopes: a supply
//! source per value backing and message handlers per destination address.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use shared_types::{Address, ArithmeticError, IpcEnvelope, TokenAmount};
use thiserror::Error;

use crate::domain::SupplyKind;

/// Failures moving value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupplyError {
    /// Owner cannot cover the amount
    #[error("Insufficient balance for {owner}: required {required}, available {available}")]
    InsufficientBalance {
        owner: Address,
        required: TokenAmount,
        available: TokenAmount,
    },

    /// No ledger for the supply kind
    #[error("Unknown supply source: {kind:?}")]
    UnknownSource { kind: SupplyKind },

    /// Checked arithmetic failed
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Value backing of one kind.
///
/// `lock` moves value from an account into router custody; `transfer` pays
/// out of custody.
pub trait SupplySource {
    /// Kind of value this source moves.
    fn kind(&self) -> SupplyKind;

    /// Pay `value` out of custody to `to`.
    fn transfer(&mut self, to: &Address, value: TokenAmount) -> Result<(), SupplyError>;

    /// Take `value` from `from` into custody.
    fn lock(&mut self, from: &Address, value: TokenAmount) -> Result<(), SupplyError>;

    /// Balance of `owner`.
    fn balance(&self, owner: &Address) -> TokenAmount;
}

/// Failure reported by a destination handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Handler reverted with data
    #[error("Handler reverted: 0x{}", hex::encode(.0))]
    Reverted(Vec<u8>),

    /// Handler refused the envelope
    #[error("Handler rejected message: {0}")]
    Rejected(String),
}

impl HandlerError {
    /// Bytes carried back in the receipt.
    pub fn into_return_data(self) -> Vec<u8> {
        match self {
            Self::Reverted(data) => data,
            Self::Rejected(reason) => reason.into_bytes(),
        }
    }
}

/// Destination of `Call` and `Result` envelopes.
pub trait MessageHandler: Send + Sync {
    /// Handle a delivered envelope, returning data for the receipt.
    fn handle_ipc_message(&self, envelope: &IpcEnvelope) -> Result<Vec<u8>, HandlerError>;
}

/// Handlers keyed by the raw destination address.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Address, Arc<dyn MessageHandler>>,
}

impl HandlerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route envelopes for `address` to `handler`, replacing any previous one.
    pub fn register(&mut self, address: Address, handler: Arc<dyn MessageHandler>) {
        self.handlers.insert(address, handler);
    }

    /// Stop routing to `address`.
    pub fn unregister(&mut self, address: &Address) -> bool {
        self.handlers.remove(address).is_some()
    }

    /// Handler for `address`.
    pub fn get(&self, address: &Address) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.get(address).cloned()
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("addresses", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Everything the router needs to execute envelopes.
pub trait ExecutionEnv {
    /// Source backing `kind`.
    fn supply_source(&mut self, kind: &SupplyKind) -> Result<&mut dyn SupplySource, SupplyError>;

    /// Handler for `address`.
    fn handler(&self, address: &Address) -> Option<Arc<dyn MessageHandler>>;
}
