//! # Gateway
//!
//! Thread-safe entry point over one [`GatewayState`].
//!
//! Every mutating operation:
//!
//! 1. takes the state lock (other threads block here),
//! 2. enters the reentrancy guard of its surface,
//! 3. runs on a clone of the state,
//! 4. collects component events and swaps the clone in on success.
//!
//! A failed operation drops the clone, so the stored state is untouched.
//! A handler calling back into the gateway while an operation runs gets
//! [`GatewayError::Reentrancy`]: the guard catches the same surface, the
//! borrowed state cell catches any other.

use std::cell::RefCell;
use std::sync::Arc;

use ipc_02_quorum::QuorumInfo;
use ipc_03_cross_msg::{ApplyOutcome, Committed, HandlerRegistry, MessageHandler, SupplyKind};
use parking_lot::{ReentrantMutex, RwLock};
use shared_types::{
    Address, BottomUpCheckpoint, BottomUpMsgBatch, ChainEpoch, Hash, IpcEnvelope, QuorumObjKind,
    SubnetId, TokenAmount, U256,
};
use ipc_telemetry::log_event;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::events::GatewayEvent;
use crate::guard::ReentrancyGuard;
use crate::state::GatewayState;

/// Gateway of one network.
pub struct Gateway {
    state: ReentrantMutex<RefCell<GatewayState>>,
    handlers: RwLock<HandlerRegistry>,
    registry_guard: ReentrancyGuard,
    staking_guard: ReentrancyGuard,
    checkpointing_guard: ReentrancyGuard,
    quorum_guard: ReentrancyGuard,
    cross_msg_guard: ReentrancyGuard,
}

impl Gateway {
    /// Gateway over fresh state for `config.network`.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        Ok(Self::from_state(GatewayState::new(config)?))
    }

    /// Gateway over existing state.
    pub fn from_state(state: GatewayState) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(state)),
            handlers: RwLock::new(HandlerRegistry::new()),
            registry_guard: ReentrancyGuard::new("registry"),
            staking_guard: ReentrancyGuard::new("staking"),
            checkpointing_guard: ReentrancyGuard::new("checkpointing"),
            quorum_guard: ReentrancyGuard::new("quorum"),
            cross_msg_guard: ReentrancyGuard::new("cross_msg"),
        }
    }

    /// Route `Call` and `Result` envelopes for `address` to `handler`.
    pub fn register_handler(&self, address: Address, handler: Arc<dyn MessageHandler>) {
        self.handlers.write().register(address, handler);
    }

    /// Stop routing to `address`.
    pub fn unregister_handler(&self, address: &Address) -> bool {
        self.handlers.write().unregister(address)
    }

    /// Read the state.
    ///
    /// Fails with `Reentrancy` when called from inside a running operation.
    pub fn with_state<R>(&self, f: impl FnOnce(&GatewayState) -> R) -> GatewayResult<R> {
        let cell = self.state.lock();
        let state = cell
            .try_borrow()
            .map_err(|_| GatewayError::Reentrancy { surface: "query" })?;
        Ok(f(&state))
    }

    /// Copy of the state.
    pub fn snapshot(&self) -> GatewayResult<GatewayState> {
        self.with_state(GatewayState::clone)
    }

    /// Drain events of committed operations.
    pub fn take_events(&self) -> GatewayResult<Vec<GatewayEvent>> {
        let cell = self.state.lock();
        let mut state = cell
            .try_borrow_mut()
            .map_err(|_| GatewayError::Reentrancy { surface: "events" })?;
        Ok(state.take_events())
    }

    fn execute<T>(
        &self,
        guard: &ReentrancyGuard,
        op: impl FnOnce(&mut GatewayState, &HandlerRegistry) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let cell = self.state.lock();
        let _scope = guard.enter()?;
        let mut current = cell.try_borrow_mut().map_err(|_| GatewayError::Reentrancy {
            surface: guard.surface(),
        })?;

        let handlers = self.handlers.read().clone();
        let mut working = current.clone();
        match op(&mut working, &handlers) {
            Ok(value) => {
                working.collect_events();
                *current = working;
                Ok(value)
            }
            Err(err) => {
                log_event!(
                    debug,
                    "gateway",
                    "Operation aborted",
                    surface = guard.surface(),
                    error = %err
                );
                Err(err)
            }
        }
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    /// Credit native value to `owner` outside of routing.
    pub fn mint(&self, owner: Address, amount: TokenAmount) -> GatewayResult<()> {
        self.execute(&self.registry_guard, |state, _| state.mint(owner, amount))
    }

    /// Credit `token` to `owner` outside of routing.
    pub fn mint_token(
        &self,
        token: Address,
        owner: Address,
        amount: TokenAmount,
    ) -> GatewayResult<()> {
        self.execute(&self.registry_guard, |state, _| {
            state.mint_token(token, owner, amount)
        })
    }

    /// Register the child subnet governed by `actor`.
    pub fn register_subnet(
        &self,
        actor: Address,
        supply_source: SupplyKind,
        current_height: ChainEpoch,
    ) -> GatewayResult<SubnetId> {
        self.execute(&self.registry_guard, |state, _| {
            state.register_subnet(actor, supply_source, current_height)
        })
    }

    /// Remove an empty child subnet.
    pub fn kill_subnet(&self, subnet: &SubnetId) -> GatewayResult<()> {
        self.execute(&self.registry_guard, |state, _| state.kill_subnet(subnet))
    }

    // =========================================================================
    // STAKING
    // =========================================================================

    /// Lock collateral of `validator` for `subnet`.
    pub fn deposit(
        &self,
        subnet: &SubnetId,
        validator: Address,
        amount: TokenAmount,
    ) -> GatewayResult<Option<u64>> {
        self.execute(&self.staking_guard, |state, _| {
            state.deposit(subnet, validator, amount)
        })
    }

    /// Request withdrawal of collateral.
    pub fn withdraw(
        &self,
        subnet: &SubnetId,
        validator: Address,
        amount: TokenAmount,
        current_height: ChainEpoch,
    ) -> GatewayResult<Option<u64>> {
        self.execute(&self.staking_guard, |state, _| {
            state.withdraw(subnet, validator, amount, current_height)
        })
    }

    /// Record new validator metadata.
    pub fn set_metadata(
        &self,
        subnet: &SubnetId,
        validator: Address,
        metadata: Vec<u8>,
    ) -> GatewayResult<u64> {
        self.execute(&self.staking_guard, |state, _| {
            state.set_metadata(subnet, validator, metadata)
        })
    }

    /// Assign federated power.
    pub fn set_federated_power(
        &self,
        subnet: &SubnetId,
        validator: Address,
        metadata: Vec<u8>,
        power: U256,
    ) -> GatewayResult<Option<u64>> {
        self.execute(&self.staking_guard, |state, _| {
            state.set_federated_power(subnet, validator, metadata, power)
        })
    }

    /// Confirm pending changes up to `configuration_number`.
    pub fn confirm_change(
        &self,
        subnet: &SubnetId,
        configuration_number: u64,
        current_height: ChainEpoch,
    ) -> GatewayResult<()> {
        self.execute(&self.staking_guard, |state, _| {
            state.confirm_change(subnet, configuration_number, current_height)
        })
    }

    /// Pay out matured releases.
    pub fn claim(
        &self,
        subnet: &SubnetId,
        validator: Address,
        current_height: ChainEpoch,
    ) -> GatewayResult<TokenAmount> {
        self.execute(&self.staking_guard, |state, _| {
            state.claim(subnet, validator, current_height)
        })
    }

    // =========================================================================
    // CHECKPOINTING
    // =========================================================================

    /// Accept the next certified checkpoint of a child.
    pub fn submit_checkpoint(
        &self,
        checkpoint: BottomUpCheckpoint,
        signers: &[Address],
        signatures: &[Vec<u8>],
        current_height: ChainEpoch,
    ) -> GatewayResult<Vec<ApplyOutcome>> {
        self.execute(&self.checkpointing_guard, |state, handlers| {
            state.submit_checkpoint(checkpoint, signers, signatures, current_height, handlers)
        })
    }

    /// Accept a certified size-triggered batch of a child.
    pub fn submit_bottom_up_msg_batch(
        &self,
        batch: BottomUpMsgBatch,
        signers: &[Address],
        signatures: &[Vec<u8>],
        current_height: ChainEpoch,
    ) -> GatewayResult<Vec<ApplyOutcome>> {
        self.execute(&self.checkpointing_guard, |state, handlers| {
            state.submit_bottom_up_msg_batch(batch, signers, signatures, current_height, handlers)
        })
    }

    /// Cut the local checkpoint at `block_height` and open its quorum.
    pub fn create_bottom_up_checkpoint(
        &self,
        block_height: ChainEpoch,
        block_hash: Hash,
        next_configuration_number: u64,
        membership_root: Hash,
        membership_weight: U256,
    ) -> GatewayResult<BottomUpCheckpoint> {
        self.execute(&self.checkpointing_guard, |state, _| {
            state.create_bottom_up_checkpoint(
                block_height,
                block_hash,
                next_configuration_number,
                membership_root,
                membership_weight,
            )
        })
    }

    /// Open the quorum of the batch cut at `height`.
    pub fn create_bottom_up_batch_quorum(
        &self,
        height: ChainEpoch,
        membership_root: Hash,
        membership_weight: U256,
    ) -> GatewayResult<BottomUpMsgBatch> {
        self.execute(&self.checkpointing_guard, |state, _| {
            state.create_bottom_up_batch_quorum(height, membership_root, membership_weight)
        })
    }

    // =========================================================================
    // QUORUM
    // =========================================================================

    /// Count a member signature.
    pub fn add_quorum_signature(
        &self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        membership_proof: &[Hash],
        weight: U256,
        signature: &[u8],
    ) -> GatewayResult<Address> {
        self.execute(&self.quorum_guard, |state, _| {
            state.add_quorum_signature(kind, height, membership_proof, weight, signature)
        })
    }

    /// Drop quorums below `retention_height`.
    pub fn prune_quorums(
        &self,
        kind: QuorumObjKind,
        retention_height: ChainEpoch,
    ) -> GatewayResult<()> {
        self.execute(&self.quorum_guard, |state, _| {
            state.prune_quorums(kind, retention_height)
        })
    }

    /// Quorum of the object at `height`.
    pub fn quorum_info(
        &self,
        kind: QuorumObjKind,
        height: ChainEpoch,
    ) -> GatewayResult<Option<QuorumInfo>> {
        self.with_state(|state| state.quorum_info(kind, height).cloned())
    }

    /// Signers and signatures collected at `height`.
    pub fn collected_signatures(
        &self,
        kind: QuorumObjKind,
        height: ChainEpoch,
    ) -> GatewayResult<(Vec<Address>, Vec<Vec<u8>>)> {
        self.with_state(|state| state.collected_signatures(kind, height))
    }

    // =========================================================================
    // CROSS-NET MESSAGES
    // =========================================================================

    /// Send value down into child `subnet`.
    pub fn fund(
        &self,
        subnet: &SubnetId,
        from: Address,
        to: Address,
        value: TokenAmount,
        current_height: ChainEpoch,
    ) -> GatewayResult<Committed> {
        self.execute(&self.cross_msg_guard, |state, handlers| {
            state.fund(subnet, from, to, value, current_height, handlers)
        })
    }

    /// Send value up to the parent.
    pub fn release(
        &self,
        from: Address,
        to: Address,
        value: TokenAmount,
        current_height: ChainEpoch,
    ) -> GatewayResult<Committed> {
        self.execute(&self.cross_msg_guard, |state, handlers| {
            state.release(from, to, value, current_height, handlers)
        })
    }

    /// Commit a contract `Call`.
    pub fn send_contract_xnet_message(
        &self,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
    ) -> GatewayResult<Committed> {
        self.execute(&self.cross_msg_guard, |state, handlers| {
            state.send_contract_xnet_message(envelope, current_height, handlers)
        })
    }

    /// Forward a postbox entry.
    pub fn propagate(&self, id: &Hash, current_height: ChainEpoch) -> GatewayResult<Committed> {
        self.execute(&self.cross_msg_guard, |state, _| {
            state.propagate(id, current_height)
        })
    }

    /// Apply messages committed by the parent.
    pub fn apply_top_down_messages(
        &self,
        msgs: Vec<IpcEnvelope>,
        current_height: ChainEpoch,
    ) -> GatewayResult<Vec<ApplyOutcome>> {
        self.execute(&self.cross_msg_guard, |state, handlers| {
            state.apply_top_down_messages(msgs, current_height, handlers)
        })
    }

    /// Apply one envelope arriving from `arriving_from`.
    pub fn apply_msg(
        &self,
        arriving_from: &SubnetId,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
    ) -> GatewayResult<ApplyOutcome> {
        self.execute(&self.cross_msg_guard, |state, handlers| {
            state.apply_msg(arriving_from, envelope, current_height, handlers)
        })
    }

    /// Commit an envelope without moving value.
    pub fn commit_cross_message(
        &self,
        envelope: IpcEnvelope,
        current_height: ChainEpoch,
    ) -> GatewayResult<Committed> {
        self.execute(&self.cross_msg_guard, |state, _| {
            state.commit_cross_message(envelope, current_height)
        })
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("handlers", &*self.handlers.read())
            .finish_non_exhaustive()
    }
}
