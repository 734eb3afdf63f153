//! # Message Router
//!
//! Applies arriving envelopes, commits outgoing ones and keeps the per-direction
//! nonces, the child subnet registry, bottom-up batches and the postbox.
//!
//! ```text
//!              commit (top-down)                 apply (top-down)
//!   parent ─────────────────────────→ top-down msgs ──────────────────→ child
//!   parent ←── exec_bottom_up_msgs ── checkpoint / batch ←── commit (bottom-up)
//! ```
//!
//! Execution failures never abort: they become `SystemErr` or `ActorErr`
//! receipts committed back towards the sender.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use shared_types::{
    checked_add, checked_sub, encode, Address, ArithmeticError, BottomUpMsgBatch, ChainEpoch,
    Hash, InvalidXnetMessageReason, IpcEnvelope, IpcMsgKind, OutcomeType, SubnetId, TokenAmount,
};
use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::domain::{
    apply_type, is_lca, is_multilevel, BatchStore, IpcMsgType, Postbox, Subnet, SubnetRegistry,
    SupplyKind,
};
use crate::error::{RouterError, RouterResult};
use crate::events::RouterEvent;
use crate::ports::inbound::{ApplyOutcome, Committed, CrossMsgApi};
use crate::ports::outbound::{ExecutionEnv, SupplyError};

/// Cross-net router of one network.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    config: RouterConfig,
    network: SubnetId,
    subnets: SubnetRegistry,
    applied_top_down_nonce: u64,
    bottom_up_nonce: u64,
    top_down_msgs: HashMap<SubnetId, Vec<IpcEnvelope>>,
    batches: BatchStore,
    postbox: Postbox,
    pending_events: Vec<RouterEvent>,
}

impl MessageRouter {
    /// Router for `network`.
    pub fn new(network: SubnetId, config: RouterConfig) -> RouterResult<Self> {
        config.validate()?;
        if network.is_empty() {
            return Err(RouterError::InvalidConfig {
                reason: "network must not be empty".into(),
            });
        }
        Ok(Self {
            batches: BatchStore::new(config.bottom_up_check_period, config.max_msgs_per_batch),
            config,
            network,
            subnets: SubnetRegistry::new(),
            applied_top_down_nonce: 0,
            bottom_up_nonce: 0,
            top_down_msgs: HashMap::new(),
            postbox: Postbox::new(),
            pending_events: Vec::new(),
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Local network.
    pub fn network(&self) -> &SubnetId {
        &self.network
    }

    /// Configuration in use.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Next top-down nonce expected from the parent.
    pub fn applied_top_down_nonce(&self) -> u64 {
        self.applied_top_down_nonce
    }

    /// Nonce the next bottom-up commit gets.
    pub fn bottom_up_nonce(&self) -> u64 {
        self.bottom_up_nonce
    }

    /// Registered child `id`.
    pub fn subnet(&self, id: &SubnetId) -> Option<&Subnet> {
        self.subnets.get(id)
    }

    /// Registered children.
    pub fn subnets(&self) -> &SubnetRegistry {
        &self.subnets
    }

    /// Top-down messages committed to `subnet` with nonce `>= from_nonce`.
    pub fn top_down_msgs(&self, subnet: &SubnetId, from_nonce: u64) -> Vec<IpcEnvelope> {
        self.top_down_msgs
            .get(subnet)
            .map(|msgs| {
                msgs.iter()
                    .filter(|m| m.nonce >= from_nonce)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Live bottom-up batch of the epoch ending at `epoch`.
    pub fn bottom_up_batch(&self, epoch: ChainEpoch) -> Option<&BottomUpMsgBatch> {
        self.batches.epoch_batch(epoch)
    }

    /// Bottom-up batch cut early at `height`.
    pub fn cut_batch(&self, height: ChainEpoch) -> Option<&BottomUpMsgBatch> {
        self.batches.cut_batch(height)
    }

    /// Remove the epoch batch so a checkpoint can carry its messages.
    pub fn take_bottom_up_batch(&mut self, epoch: ChainEpoch) -> Vec<IpcEnvelope> {
        self.batches
            .take_epoch_batch(epoch)
            .map(|batch| batch.msgs)
            .unwrap_or_default()
    }

    /// Forget early-cut batches below `height`.
    pub fn prune_cut_batches(&mut self, height: ChainEpoch) {
        self.batches.prune_cut(height);
    }

    /// Parked envelope `id`.
    pub fn postbox_entry(&self, id: &Hash) -> Option<&IpcEnvelope> {
        self.postbox.get(id)
    }

    /// Ids of parked envelopes.
    pub fn postbox_ids(&self) -> Vec<Hash> {
        self.postbox.ids()
    }

    /// Take events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<RouterEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // =========================================================================
    // SUBNET REGISTRY
    // =========================================================================

    /// Register a direct child of the local network.
    pub fn register_subnet(
        &mut self,
        id: SubnetId,
        supply_source: SupplyKind,
        stake: TokenAmount,
        genesis_epoch: ChainEpoch,
    ) -> RouterResult<()> {
        if id.parent().as_ref() != Some(&self.network) {
            return Err(RouterError::MethodNotAllowed {
                reason: "subnet is not a child of the local network",
            });
        }
        self.subnets
            .register(Subnet::new(id.clone(), supply_source, stake, genesis_epoch))?;
        info!(subnet = %id, ?supply_source, %stake, "Subnet registered");
        self.pending_events
            .push(RouterEvent::SubnetRegistered { subnet: id });
        Ok(())
    }

    /// Remove a child whose circulating supply is fully released.
    pub fn kill_subnet(&mut self, id: &SubnetId) -> RouterResult<Subnet> {
        let subnet = self
            .subnets
            .get(id)
            .ok_or_else(|| RouterError::NotRegisteredSubnet { subnet: id.clone() })?;
        if !subnet.circ_supply.is_zero() {
            return Err(RouterError::SubnetNotEmpty {
                subnet: id.clone(),
                circ_supply: subnet.circ_supply,
            });
        }
        let removed = self.subnets.remove(id)?;
        self.top_down_msgs.remove(id);
        info!(subnet = %id, "Subnet killed");
        self.pending_events
            .push(RouterEvent::SubnetKilled { subnet: id.clone() });
        Ok(removed)
    }

    /// Record the collateral a child holds at the parent.
    pub fn set_subnet_stake(&mut self, id: &SubnetId, stake: TokenAmount) -> RouterResult<()> {
        self.subnets.get_mut(id)?.stake = stake;
        Ok(())
    }

    // =========================================================================
    // ENTRY POINTS
    // =========================================================================

    /// Move `value` from `from` down into child `subnet` for `to`.
    pub fn fund(
        &mut self,
        subnet: &SubnetId,
        from: Address,
        to: Address,
        value: TokenAmount,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<Committed> {
        if value.is_zero() {
            return Err(RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::Value,
            });
        }
        let kind = self
            .subnets
            .get(subnet)
            .ok_or_else(|| RouterError::NotRegisteredSubnet {
                subnet: subnet.clone(),
            })?
            .supply_source;
        let envelope = IpcEnvelope::new_fund(subnet, from, to, value).ok_or(
            RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::DstSubnet,
            },
        )?;

        env.supply_source(&kind)?.lock(&from, value)?;
        self.commit_cross_message(envelope, current_height)
    }

    /// Send `value` from `from` up to `to` on the parent.
    ///
    /// The value is taken into custody, which on a child removes it from
    /// circulation.
    pub fn release(
        &mut self,
        from: Address,
        to: Address,
        value: TokenAmount,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<Committed> {
        if value.is_zero() {
            return Err(RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::Value,
            });
        }
        let envelope = IpcEnvelope::new_release(&self.network, from, to, value).ok_or(
            RouterError::NoParent {
                network: self.network.clone(),
            },
        )?;

        env.supply_source(&SupplyKind::Native)?.lock(&from, value)?;
        let committed = self.commit_cross_message(envelope, current_height)?;
        if committed.should_burn {
            debug!(%from, %value, "Released value burned");
        }
        Ok(committed)
    }

    /// Commit a `Call` sent by a contract on the local network.
    pub fn send_contract_xnet_message(
        &mut self,
        mut envelope: IpcEnvelope,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<Committed> {
        if envelope.kind != IpcMsgKind::Call {
            return Err(RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::Kind,
            });
        }
        if envelope.from.subnet != self.network {
            return Err(RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::Sender,
            });
        }
        envelope.nonce = 0;

        if !envelope.value.is_zero() {
            env.supply_source(&SupplyKind::Native)?
                .lock(&envelope.from.raw, envelope.value)?;
        }
        self.commit_cross_message(envelope, current_height)
    }

    /// Forward the postbox entry `id`.
    pub fn propagate(&mut self, id: &Hash, current_height: ChainEpoch) -> RouterResult<Committed> {
        let envelope = self
            .postbox
            .get(id)
            .cloned()
            .ok_or(RouterError::PostboxNotFound { id: *id })?;

        let committed = self.commit_cross_message(envelope, current_height)?;
        self.postbox.take(id);
        debug!(%id, "Postbox entry propagated");
        self.pending_events
            .push(RouterEvent::MessagePropagated { id: *id });
        Ok(committed)
    }

    /// Apply, in order, messages the parent committed to this network.
    pub fn apply_top_down_messages(
        &mut self,
        msgs: Vec<IpcEnvelope>,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<Vec<ApplyOutcome>> {
        let parent = self.network.parent().ok_or(RouterError::NoParent {
            network: self.network.clone(),
        })?;
        msgs.into_iter()
            .map(|msg| self.apply_msg(&parent, msg, current_height, env))
            .collect()
    }

    /// Settle bottom-up messages of a certified checkpoint or batch of `child`.
    pub fn exec_bottom_up_msgs(
        &mut self,
        child: &SubnetId,
        msgs: Vec<IpcEnvelope>,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<Vec<ApplyOutcome>> {
        let total = msgs
            .iter()
            .try_fold(TokenAmount::zero(), |acc, m| checked_add(acc, m.value))?;

        let subnet = self.subnets.get_mut(child)?;
        if subnet.circ_supply < total {
            return Err(RouterError::NotEnoughFunds {
                required: total,
                available: subnet.circ_supply,
            });
        }
        subnet.circ_supply = checked_sub(subnet.circ_supply, total)?;

        debug!(subnet = %child, count = msgs.len(), %total, "Executing bottom-up messages");
        msgs.into_iter()
            .map(|msg| self.apply_msg(child, msg, current_height, env))
            .collect()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn reject(
        &mut self,
        envelope: &IpcEnvelope,
        reason: InvalidXnetMessageReason,
        current_height: ChainEpoch,
    ) -> ApplyOutcome {
        warn!(
            from = %envelope.from.subnet,
            to = %envelope.to.subnet,
            nonce = envelope.nonce,
            ?reason,
            "Cross-net message rejected"
        );
        let ret = encode(&reason).unwrap_or_default();
        let receipt = self.send_receipt(envelope, OutcomeType::SystemErr, ret, current_height);
        ApplyOutcome::Rejected { reason, receipt }
    }

    /// Commit a result envelope answering `original`. Failures are logged and
    /// dropped; results are never answered.
    fn send_receipt(
        &mut self,
        original: &IpcEnvelope,
        outcome: OutcomeType,
        ret: Vec<u8>,
        current_height: ChainEpoch,
    ) -> Option<IpcEnvelope> {
        if original.kind == IpcMsgKind::Result {
            return None;
        }
        let mut result = match original.new_result(outcome, ret) {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "Receipt could not be encoded");
                return None;
            }
        };
        if result.from.subnet.is_empty() {
            result.from.subnet = self.network.clone();
        }
        match self.commit_cross_message(result, current_height) {
            Ok(committed) => Some(committed.envelope),
            Err(err) => {
                warn!(
                    to = %original.from.subnet,
                    ?outcome,
                    error = %err,
                    "Receipt dropped"
                );
                None
            }
        }
    }

    fn check_propagation(&self, envelope: &IpcEnvelope) -> RouterResult<()> {
        if envelope.kind != IpcMsgKind::Transfer
            || self.config.token_propagation
            || envelope.from.subnet == self.network
        {
            return Ok(());
        }

        let hops = [
            envelope.from.subnet.down(&self.network),
            envelope.to.subnet.down(&self.network),
        ];
        let token_hop = hops
            .iter()
            .flatten()
            .filter_map(|hop| self.subnets.get(hop))
            .any(|subnet| subnet.supply_source.is_token());
        if token_hop {
            return Err(RouterError::MethodNotAllowed {
                reason: "propagation of transfers through token-backed subnets is not supported",
            });
        }
        Ok(())
    }

    fn child_towards(&self, to: &SubnetId) -> RouterResult<SubnetId> {
        to.down(&self.network)
            .filter(|child| child.parent().as_ref() == Some(&self.network))
            .ok_or(RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::DstSubnet,
            })
    }
}

impl CrossMsgApi for MessageRouter {
    fn apply_msg(
        &mut self,
        arriving_from: &SubnetId,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
        env: &mut dyn ExecutionEnv,
    ) -> RouterResult<ApplyOutcome> {
        if envelope.to.subnet.is_empty() {
            return Ok(self.reject(
                &envelope,
                InvalidXnetMessageReason::DstSubnet,
                current_height,
            ));
        }

        let supply_kind = match apply_type(&envelope, &self.network) {
            IpcMsgType::BottomUp => {
                let Some(subnet) = self.subnets.get(arriving_from) else {
                    warn!(
                        from = %arriving_from,
                        nonce = envelope.nonce,
                        "Bottom-up message from unregistered subnet dropped"
                    );
                    return Ok(ApplyOutcome::Dropped);
                };
                let expected = subnet.applied_bottom_up_nonce;
                let supply_kind = subnet.supply_source;
                self.subnets.get_mut(arriving_from)?.applied_bottom_up_nonce = expected
                    .checked_add(1)
                    .ok_or(ArithmeticError::Overflow)?;
                if envelope.nonce != expected {
                    return Ok(self.reject(
                        &envelope,
                        InvalidXnetMessageReason::Nonce,
                        current_height,
                    ));
                }
                supply_kind
            }
            IpcMsgType::TopDown => {
                let expected = self.applied_top_down_nonce;
                self.applied_top_down_nonce = expected
                    .checked_add(1)
                    .ok_or(ArithmeticError::Overflow)?;
                if envelope.nonce != expected {
                    return Ok(self.reject(
                        &envelope,
                        InvalidXnetMessageReason::Nonce,
                        current_height,
                    ));
                }
                SupplyKind::Native
            }
        };

        if envelope.to.subnet != self.network {
            let id = self.postbox.store(envelope)?;
            debug!(%id, "Envelope queued for propagation");
            self.pending_events
                .push(RouterEvent::QueuedForPropagation { id });
            return Ok(ApplyOutcome::Forwarded { id });
        }

        let (success, ret) = execute(&envelope, &supply_kind, env);
        debug!(
            kind = ?envelope.kind,
            to = %envelope.to.raw,
            nonce = envelope.nonce,
            success,
            ret = %hex::encode(&ret),
            "Envelope executed"
        );

        let receipt = if envelope.kind == IpcMsgKind::Call {
            let outcome = if success {
                OutcomeType::Ok
            } else {
                OutcomeType::ActorErr
            };
            self.send_receipt(&envelope, outcome, ret.clone(), current_height)
        } else {
            None
        };

        Ok(ApplyOutcome::Executed {
            success,
            ret,
            receipt,
        })
    }

    fn commit_cross_message(
        &mut self,
        mut envelope: IpcEnvelope,
        current_height: ChainEpoch,
    ) -> RouterResult<Committed> {
        let to = envelope.to.subnet.clone();
        if to.is_empty() {
            return Err(RouterError::EmptyDestination);
        }
        if to == self.network {
            return Err(RouterError::SelfDestination);
        }
        if envelope.from.subnet.common_parent(&to).is_none() {
            return Err(RouterError::InvalidXnetMessage {
                reason: InvalidXnetMessageReason::CommonParentNotExist,
            });
        }
        if !self.config.multilevel_enabled && is_multilevel(&envelope.from.subnet, &to) {
            return Err(RouterError::MethodNotAllowed {
                reason: "multi-level cross-net messages are disabled",
            });
        }
        self.check_propagation(&envelope)?;

        let lca = is_lca(&envelope, &self.network);
        let direction = apply_type(&envelope, &self.network);

        if direction == IpcMsgType::TopDown || lca {
            let child = self.child_towards(&to)?;
            let subnet = self.subnets.get_mut(&child)?;
            let nonce = subnet.top_down_nonce;
            let next_nonce = nonce.checked_add(1).ok_or(ArithmeticError::Overflow)?;
            let circ_supply = checked_add(subnet.circ_supply, envelope.value)?;

            envelope.nonce = nonce;
            let id = envelope.to_hash()?;

            subnet.top_down_nonce = next_nonce;
            subnet.circ_supply = circ_supply;
            self.top_down_msgs
                .entry(child.clone())
                .or_default()
                .push(envelope.clone());

            info!(subnet = %child, nonce, value = %envelope.value, %id, "Top-down message committed");
            self.pending_events.push(RouterEvent::NewTopDownMessage {
                subnet: child,
                envelope: envelope.clone(),
                id,
            });
            return Ok(Committed {
                envelope,
                direction: IpcMsgType::TopDown,
                should_burn: false,
            });
        }

        let nonce = self.bottom_up_nonce;
        let next_nonce = nonce.checked_add(1).ok_or(ArithmeticError::Overflow)?;
        envelope.nonce = nonce;

        let cut = self
            .batches
            .append(&self.network, envelope.clone(), current_height)?;
        self.bottom_up_nonce = next_nonce;

        debug!(nonce, value = %envelope.value, height = current_height, "Bottom-up message committed");
        if let Some(batch) = cut {
            info!(
                height = batch.block_height,
                msgs = batch.msgs.len(),
                "Bottom-up batch cut"
            );
            self.pending_events.push(RouterEvent::NewBottomUpMsgBatch {
                height: batch.block_height,
            });
        }

        let should_burn = !envelope.value.is_zero();
        Ok(Committed {
            envelope,
            direction: IpcMsgType::BottomUp,
            should_burn,
        })
    }
}

/// Run `envelope` against the destination. Never fails; the flag and bytes
/// feed the receipt.
fn execute(
    envelope: &IpcEnvelope,
    supply_kind: &SupplyKind,
    env: &mut dyn ExecutionEnv,
) -> (bool, Vec<u8>) {
    match envelope.kind {
        IpcMsgKind::Transfer => match pay(envelope, supply_kind, env) {
            Ok(()) => (true, Vec::new()),
            Err(err) => (false, err.to_string().into_bytes()),
        },
        IpcMsgKind::Call | IpcMsgKind::Result => {
            let Some(handler) = env.handler(&envelope.to.raw) else {
                return (false, b"no handler for destination".to_vec());
            };
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| handler.handle_ipc_message(envelope)));
            match result {
                Ok(Ok(ret)) => match pay(envelope, supply_kind, env) {
                    Ok(()) => (true, ret),
                    Err(err) => (false, err.to_string().into_bytes()),
                },
                Ok(Err(err)) => (false, err.into_return_data()),
                Err(_) => (false, b"handler panicked".to_vec()),
            }
        }
    }
}

fn pay(
    envelope: &IpcEnvelope,
    supply_kind: &SupplyKind,
    env: &mut dyn ExecutionEnv,
) -> Result<(), SupplyError> {
    if envelope.value.is_zero() {
        return Ok(());
    }
    env.supply_source(supply_kind)?
        .transfer(&envelope.to.raw, envelope.value)
}
