//! Execution environment passed into the router.

use std::sync::Arc;

use ipc_03_cross_msg::{
    ExecutionEnv, HandlerRegistry, MessageHandler, SupplyError, SupplyKind, SupplySource,
};
use shared_types::Address;

use super::ledger::Ledgers;

/// Borrowed ledgers and handlers for one operation.
pub struct GatewayEnv<'a> {
    ledgers: &'a mut Ledgers,
    handlers: &'a HandlerRegistry,
}

impl<'a> GatewayEnv<'a> {
    /// Environment over `ledgers` dispatching to `handlers`.
    pub fn new(ledgers: &'a mut Ledgers, handlers: &'a HandlerRegistry) -> Self {
        Self { ledgers, handlers }
    }
}

impl ExecutionEnv for GatewayEnv<'_> {
    fn supply_source(&mut self, kind: &SupplyKind) -> Result<&mut dyn SupplySource, SupplyError> {
        self.ledgers.source_mut(kind)
    }

    fn handler(&self, address: &Address) -> Option<Arc<dyn MessageHandler>> {
        self.handlers.get(address)
    }
}
