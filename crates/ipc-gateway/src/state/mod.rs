//! # Gateway State
//!
//! The single state object every gateway operation runs against: router,
//! certifier, parent-side subnet actors, child-side checkpoints and the
//! ledgers backing cross-net value.
//!
//! Operations here are plain `&mut self` methods. Atomicity and reentrancy
//! protection are added by [`crate::Gateway`], which runs each operation on
//! a clone and swaps it in only on success.

mod actor;
mod checkpointing;
mod routing;

pub use actor::SubnetActor;

use std::collections::{BTreeMap, HashMap};

use ipc_02_quorum::CertifierService;
use ipc_03_cross_msg::{MessageRouter, SupplyKind, SupplySource};
use ipc_telemetry::log_subnet_event;
use shared_types::{Address, BottomUpCheckpoint, ChainEpoch, SubnetId, TokenAmount, U256};
use tracing::info;

use crate::adapters::{Ledgers, NativeLedger};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::events::GatewayEvent;

/// All state of one network's gateway.
#[derive(Debug, Clone)]
pub struct GatewayState {
    config: GatewayConfig,
    router: MessageRouter,
    certifier: CertifierService,
    actors: HashMap<SubnetId, SubnetActor>,
    checkpoints: BTreeMap<ChainEpoch, BottomUpCheckpoint>,
    ledgers: Ledgers,
    events: Vec<GatewayEvent>,
}

impl GatewayState {
    /// Empty state for `config.network`.
    ///
    /// A root network escrows native value; a child mints what its parent
    /// sends down.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;
        let native = if config.network.is_root() {
            NativeLedger::new()
        } else {
            NativeLedger::mintable()
        };
        Ok(Self {
            router: MessageRouter::new(config.network.clone(), config.router.clone())?,
            certifier: CertifierService::new(config.quorum)?,
            actors: HashMap::new(),
            checkpoints: BTreeMap::new(),
            ledgers: Ledgers::new(native),
            events: Vec::new(),
            config,
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Configuration in use.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Local network.
    pub fn network(&self) -> &SubnetId {
        &self.config.network
    }

    /// Cross-net router.
    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Checkpoint and batch certifier.
    pub fn certifier(&self) -> &CertifierService {
        &self.certifier
    }

    /// Actor of child `subnet`.
    pub fn actor(&self, subnet: &SubnetId) -> Option<&SubnetActor> {
        self.actors.get(subnet)
    }

    /// Supply ledgers.
    pub fn ledgers(&self) -> &Ledgers {
        &self.ledgers
    }

    /// Balance of `owner` in `kind`.
    pub fn balance(&self, kind: &SupplyKind, owner: &Address) -> TokenAmount {
        self.ledgers.balance(kind, owner)
    }

    /// Local checkpoint created at `height`.
    pub fn bottom_up_checkpoint(&self, height: ChainEpoch) -> Option<&BottomUpCheckpoint> {
        self.checkpoints.get(&height)
    }

    /// Move events of every component into the gateway queue.
    pub fn collect_events(&mut self) {
        let router_events = self.router.take_events();
        let quorum_events = self.certifier.take_events();
        for actor in self.actors.values_mut() {
            let subnet = actor.id().clone();
            self.events.extend(
                actor
                    .take_events()
                    .into_iter()
                    .map(|event| GatewayEvent::Staking {
                        subnet: subnet.clone(),
                        event,
                    }),
            );
        }
        self.events
            .extend(quorum_events.into_iter().map(GatewayEvent::Quorum));
        self.events
            .extend(router_events.into_iter().map(GatewayEvent::Router));
    }

    /// Take collected events.
    pub fn take_events(&mut self) -> Vec<GatewayEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Credit native value to `owner` outside of routing.
    pub fn mint(&mut self, owner: Address, amount: TokenAmount) -> GatewayResult<()> {
        Ok(self.ledgers.native_mut().mint(owner, amount)?)
    }

    /// Credit `token` to `owner` outside of routing.
    pub fn mint_token(
        &mut self,
        token: Address,
        owner: Address,
        amount: TokenAmount,
    ) -> GatewayResult<()> {
        Ok(self.ledgers.token_mut(token).mint(owner, amount)?)
    }

    // =========================================================================
    // SUBNET REGISTRY
    // =========================================================================

    /// Register the child governed by `actor`.
    pub fn register_subnet(
        &mut self,
        actor: Address,
        supply_source: SupplyKind,
        current_height: ChainEpoch,
    ) -> GatewayResult<SubnetId> {
        let id = SubnetId::child_of(self.network(), actor);
        self.router.register_subnet(
            id.clone(),
            supply_source,
            TokenAmount::zero(),
            current_height,
        )?;
        if let SupplyKind::Token { address } = supply_source {
            self.ledgers.token_mut(address);
        }
        self.actors.insert(
            id.clone(),
            SubnetActor::new(id.clone(), self.config.staking.clone())?,
        );
        Ok(id)
    }

    /// Remove a child with no validators and no circulating supply.
    pub fn kill_subnet(&mut self, subnet: &SubnetId) -> GatewayResult<()> {
        let actor = self.actor_ref(subnet)?;
        let validators = actor.validator_count();
        if validators > 0 {
            return Err(GatewayError::SubnetHasValidators {
                subnet: subnet.clone(),
                validators,
            });
        }
        self.router.kill_subnet(subnet)?;
        self.actors.remove(subnet);
        Ok(())
    }

    // =========================================================================
    // STAKING
    // =========================================================================

    /// Lock `amount` of `validator` as collateral for `subnet`.
    pub fn deposit(
        &mut self,
        subnet: &SubnetId,
        validator: Address,
        amount: TokenAmount,
    ) -> GatewayResult<Option<u64>> {
        let actor = self
            .actors
            .get_mut(subnet)
            .ok_or_else(|| GatewayError::SubnetNotFound {
                subnet: subnet.clone(),
            })?;
        self.ledgers.native_mut().lock(&validator, amount)?;
        let (number, bootstrapped) = actor.deposit(validator, amount)?;
        let stake = actor.stake();
        self.router.set_subnet_stake(subnet, stake)?;

        log_subnet_event!(
            debug,
            "gateway",
            "Collateral deposited",
            subnet,
            validator = %validator,
            amount = %amount,
            configuration_number = ?number
        );
        if bootstrapped {
            info!(subnet = %subnet, stake = %stake, "Subnet bootstrapped");
            self.events.push(GatewayEvent::SubnetBootstrapped {
                subnet: subnet.clone(),
            });
        }
        Ok(number)
    }

    /// Request withdrawal of `amount` of `validator`'s collateral.
    pub fn withdraw(
        &mut self,
        subnet: &SubnetId,
        validator: Address,
        amount: TokenAmount,
        current_height: ChainEpoch,
    ) -> GatewayResult<Option<u64>> {
        let actor = self.actor_mut(subnet)?;
        let number = actor.withdraw(validator, amount, current_height)?;
        let stake = actor.stake();
        self.router.set_subnet_stake(subnet, stake)?;
        Ok(number)
    }

    /// Record new metadata for `validator`.
    pub fn set_metadata(
        &mut self,
        subnet: &SubnetId,
        validator: Address,
        metadata: Vec<u8>,
    ) -> GatewayResult<u64> {
        self.actor_mut(subnet)?.set_metadata(validator, metadata)
    }

    /// Assign federated power to `validator`.
    pub fn set_federated_power(
        &mut self,
        subnet: &SubnetId,
        validator: Address,
        metadata: Vec<u8>,
        power: U256,
    ) -> GatewayResult<Option<u64>> {
        let (number, bootstrapped) = self
            .actor_mut(subnet)?
            .set_federated_power(validator, metadata, power)?;
        if bootstrapped {
            info!(subnet = %subnet, "Subnet bootstrapped");
            self.events.push(GatewayEvent::SubnetBootstrapped {
                subnet: subnet.clone(),
            });
        }
        Ok(number)
    }

    /// Confirm pending changes of `subnet` up to `configuration_number`.
    pub fn confirm_change(
        &mut self,
        subnet: &SubnetId,
        configuration_number: u64,
        current_height: ChainEpoch,
    ) -> GatewayResult<()> {
        let actor = self.actor_mut(subnet)?;
        actor.confirm_change(configuration_number, current_height)?;
        let stake = actor.stake();
        self.router.set_subnet_stake(subnet, stake)?;
        Ok(())
    }

    /// Pay out the matured releases of `validator`.
    pub fn claim(
        &mut self,
        subnet: &SubnetId,
        validator: Address,
        current_height: ChainEpoch,
    ) -> GatewayResult<TokenAmount> {
        let amount = self
            .actor_mut(subnet)?
            .claim(validator, current_height)?;
        if !amount.is_zero() {
            self.ledgers.native_mut().transfer(&validator, amount)?;
        }
        Ok(amount)
    }

    fn actor_ref(&self, subnet: &SubnetId) -> GatewayResult<&SubnetActor> {
        self.actors
            .get(subnet)
            .ok_or_else(|| GatewayError::SubnetNotFound {
                subnet: subnet.clone(),
            })
    }

    fn actor_mut(&mut self, subnet: &SubnetId) -> GatewayResult<&mut SubnetActor> {
        self.actors
            .get_mut(subnet)
            .ok_or_else(|| GatewayError::SubnetNotFound {
                subnet: subnet.clone(),
            })
    }
}
