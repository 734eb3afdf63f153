//! Staking Service - validator set lifecycle
//!
//! Requests update pending collateral immediately and record a deferred
//! change; confirmation replays the log in order against the validator set.

use shared_types::{Address, ChainEpoch, TokenAmount, U256};
use tracing::{debug, info};

use crate::config::StakingConfig;
use crate::domain::{
    PermissionMode, StakingChange, StakingChangeLog, StakingOperation, StakingRelease,
    StakingReleaseQueue, ValidatorSet,
};
use crate::error::{StakingError, StakingResult};
use crate::events::StakingEvent;
use crate::ports::inbound::StakingApi;

/// Validator set, change log and release queue of one subnet.
#[derive(Debug, Clone)]
pub struct StakingService {
    config: StakingConfig,
    validators: ValidatorSet,
    changes: StakingChangeLog,
    releases: StakingReleaseQueue,
    pending_events: Vec<StakingEvent>,
}

impl StakingService {
    /// Create a service from a validated config.
    pub fn new(config: StakingConfig) -> StakingResult<Self> {
        config.validate()?;
        Ok(Self {
            validators: ValidatorSet::new(config.permission_mode, config.active_limit),
            changes: StakingChangeLog::new(),
            releases: StakingReleaseQueue::new(config.locking_duration),
            pending_events: Vec::new(),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Validator set.
    pub fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    /// Change log.
    pub fn changes(&self) -> &StakingChangeLog {
        &self.changes
    }

    /// Pending releases of `validator`.
    pub fn releases(&self, validator: &Address) -> Vec<StakingRelease> {
        self.releases.pending(validator)
    }

    /// Number the next change will get.
    pub fn next_configuration_number(&self) -> u64 {
        self.changes.next_configuration_number()
    }

    /// Take events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn require_collateral_mode(&self, operation: &'static str) -> StakingResult<()> {
        match self.config.permission_mode {
            PermissionMode::Federated => Err(StakingError::PermissionModeMismatch {
                operation,
                mode: PermissionMode::Federated,
            }),
            PermissionMode::Collateral | PermissionMode::Static => Ok(()),
        }
    }

    fn require_federated_mode(&self, operation: &'static str) -> StakingResult<()> {
        match self.config.permission_mode {
            PermissionMode::Federated => Ok(()),
            mode => Err(StakingError::PermissionModeMismatch { operation, mode }),
        }
    }

    fn record(&mut self, validator: Address, operation: StakingOperation) -> u64 {
        let configuration_number = self.changes.record_change(validator, operation.clone());
        debug!(%validator, configuration_number, ?operation, "Staking change recorded");
        self.pending_events.push(StakingEvent::NewStakingChangeRequest {
            operation,
            validator,
            configuration_number,
        });
        configuration_number
    }

    /// Confirm every recorded change. Returns the confirmed number, if any.
    pub fn confirm_next(&mut self, current_height: ChainEpoch) -> StakingResult<Option<u64>> {
        if self.changes.pending() == 0 {
            return Ok(None);
        }
        let target = self.changes.next_configuration_number() - 1;
        self.confirm_change(target, current_height)?;
        Ok(Some(target))
    }

    // =========================================================================
    // IMMEDIATE VARIANTS (before the subnet bootstraps)
    // =========================================================================

    /// Deposit applied straight to the validator set.
    pub fn deposit_with_confirm(
        &mut self,
        validator: Address,
        amount: TokenAmount,
    ) -> StakingResult<()> {
        self.require_collateral_mode("deposit")?;
        if amount.is_zero() {
            return Err(StakingError::ZeroAmount);
        }
        self.validators.record_deposit(validator, amount)?;
        self.validators
            .confirm_deposit(validator, amount, &mut self.pending_events)
    }

    /// Withdrawal applied straight to the validator set, then locked.
    pub fn withdraw_with_confirm(
        &mut self,
        validator: Address,
        amount: TokenAmount,
        current_height: ChainEpoch,
    ) -> StakingResult<()> {
        self.require_collateral_mode("withdraw")?;
        if amount.is_zero() {
            return Err(StakingError::ZeroAmount);
        }
        self.validators.record_withdraw(&validator, amount)?;
        self.validators
            .confirm_withdraw(validator, amount, &mut self.pending_events)?;
        self.queue_release(validator, amount, current_height)
    }

    /// Federated power applied straight to the validator set.
    pub fn set_federated_power_with_confirm(
        &mut self,
        validator: Address,
        metadata: Vec<u8>,
        power: U256,
    ) -> StakingResult<()> {
        self.require_federated_mode("set_federated_power")?;
        self.validators
            .confirm_federated_power(validator, metadata, power, &mut self.pending_events)
    }

    fn queue_release(
        &mut self,
        validator: Address,
        amount: TokenAmount,
        current_height: ChainEpoch,
    ) -> StakingResult<()> {
        let release = self
            .releases
            .add_new_release(validator, amount, current_height)?;
        self.pending_events.push(StakingEvent::CollateralReleaseQueued {
            validator,
            amount,
            release_at: release.release_at,
        });
        Ok(())
    }

    fn apply(&mut self, change: StakingChange, current_height: ChainEpoch) -> StakingResult<()> {
        let StakingChange {
            operation,
            validator,
        } = change;
        match operation {
            StakingOperation::Deposit { amount } => {
                self.validators
                    .confirm_deposit(validator, amount, &mut self.pending_events)
            }
            StakingOperation::Withdraw { amount } => {
                self.validators
                    .confirm_withdraw(validator, amount, &mut self.pending_events)?;
                self.queue_release(validator, amount, current_height)
            }
            StakingOperation::SetFederatedPower { metadata, power } => self
                .validators
                .confirm_federated_power(validator, metadata, power, &mut self.pending_events),
            StakingOperation::SetMetadata { metadata } => {
                self.validators.set_metadata(validator, metadata);
                Ok(())
            }
        }
    }
}

impl StakingApi for StakingService {
    fn deposit(&mut self, validator: Address, amount: TokenAmount) -> StakingResult<u64> {
        self.require_collateral_mode("deposit")?;
        if amount.is_zero() {
            return Err(StakingError::ZeroAmount);
        }
        self.validators.record_deposit(validator, amount)?;
        Ok(self.record(validator, StakingOperation::Deposit { amount }))
    }

    fn withdraw(&mut self, validator: Address, amount: TokenAmount) -> StakingResult<u64> {
        self.require_collateral_mode("withdraw")?;
        if amount.is_zero() {
            return Err(StakingError::ZeroAmount);
        }
        self.validators.record_withdraw(&validator, amount)?;
        Ok(self.record(validator, StakingOperation::Withdraw { amount }))
    }

    fn set_metadata(&mut self, validator: Address, metadata: Vec<u8>) -> StakingResult<u64> {
        if self.validators.validator(&validator).is_none() {
            return Err(StakingError::NotValidator { validator });
        }
        Ok(self.record(validator, StakingOperation::SetMetadata { metadata }))
    }

    fn set_federated_power(
        &mut self,
        validator: Address,
        metadata: Vec<u8>,
        power: U256,
    ) -> StakingResult<u64> {
        self.require_federated_mode("set_federated_power")?;
        Ok(self.record(
            validator,
            StakingOperation::SetFederatedPower { metadata, power },
        ))
    }

    fn confirm_change(
        &mut self,
        configuration_number: u64,
        current_height: ChainEpoch,
    ) -> StakingResult<()> {
        let next = self.changes.next_configuration_number();
        if configuration_number >= next {
            return Err(StakingError::FutureConfigurationNumber {
                requested: configuration_number,
                next,
            });
        }

        let start = self.changes.start_configuration_number();
        if configuration_number < start {
            debug!(configuration_number, start, "Change already confirmed");
            return Ok(());
        }

        for number in start..=configuration_number {
            if let Some(change) = self.changes.purge(number) {
                self.apply(change, current_height)?;
            }
        }
        self.changes.set_start(configuration_number + 1);

        info!(
            configuration_number,
            active = self.validators.active_count(),
            waiting = self.validators.waiting_count(),
            "Configuration confirmed"
        );
        self.pending_events
            .push(StakingEvent::ConfigurationNumberConfirmed {
                configuration_number,
            });
        Ok(())
    }

    fn claim(
        &mut self,
        validator: Address,
        current_height: ChainEpoch,
    ) -> StakingResult<TokenAmount> {
        let amount = self
            .releases
            .claim(&validator, current_height)?
            .ok_or(StakingError::NothingToClaim { validator })?;

        debug!(%validator, %amount, current_height, "Collateral claimed");
        self.pending_events
            .push(StakingEvent::CollateralClaimed { validator, amount });
        Ok(amount)
    }
}
