//! Cross-net entry points of the gateway state.

use ipc_03_cross_msg::{ApplyOutcome, Committed, CrossMsgApi, HandlerRegistry};
use shared_types::{Address, ChainEpoch, Hash, IpcEnvelope, SubnetId, TokenAmount};

use super::GatewayState;
use crate::adapters::GatewayEnv;
use crate::error::GatewayResult;

impl GatewayState {
    /// Send `value` from `from` down into child `subnet` for `to`.
    pub fn fund(
        &mut self,
        subnet: &SubnetId,
        from: Address,
        to: Address,
        value: TokenAmount,
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<Committed> {
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        Ok(self
            .router
            .fund(subnet, from, to, value, current_height, &mut env)?)
    }

    /// Send `value` from `from` up to `to` on the parent.
    pub fn release(
        &mut self,
        from: Address,
        to: Address,
        value: TokenAmount,
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<Committed> {
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        Ok(self
            .router
            .release(from, to, value, current_height, &mut env)?)
    }

    /// Commit a contract `Call`.
    pub fn send_contract_xnet_message(
        &mut self,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<Committed> {
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        Ok(self
            .router
            .send_contract_xnet_message(envelope, current_height, &mut env)?)
    }

    /// Forward a postbox entry.
    pub fn propagate(&mut self, id: &Hash, current_height: ChainEpoch) -> GatewayResult<Committed> {
        Ok(self.router.propagate(id, current_height)?)
    }

    /// Apply messages the parent committed to this network.
    pub fn apply_top_down_messages(
        &mut self,
        msgs: Vec<IpcEnvelope>,
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<Vec<ApplyOutcome>> {
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        Ok(self
            .router
            .apply_top_down_messages(msgs, current_height, &mut env)?)
    }

    /// Apply one envelope arriving from `arriving_from`.
    pub fn apply_msg(
        &mut self,
        arriving_from: &SubnetId,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<ApplyOutcome> {
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        Ok(self
            .router
            .apply_msg(arriving_from, envelope, current_height, &mut env)?)
    }

    /// Commit an envelope without moving value.
    pub fn commit_cross_message(
        &mut self,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
    ) -> GatewayResult<Committed> {
        Ok(self
            .router
            .commit_cross_message(envelope, current_height)?)
    }
}
