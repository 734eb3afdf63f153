//! # Subnet Actor
//!
//! Parent-side governor of one child subnet: its validator set, bootstrap
//! status and the heights of the last settled checkpoint and batch.

use ipc_01_staking::{
    PermissionMode, StakingApi, StakingConfig, StakingEvent, StakingService,
};
use shared_types::{weighted_threshold, Address, ChainEpoch, SubnetId, TokenAmount, U256};

use crate::error::{GatewayError, GatewayResult};

/// Child subnet as seen from its parent.
#[derive(Debug, Clone)]
pub struct SubnetActor {
    id: SubnetId,
    staking: StakingService,
    bootstrapped: bool,
    last_bottom_up_checkpoint_height: ChainEpoch,
    last_bottom_up_batch_height: ChainEpoch,
}

impl SubnetActor {
    /// Actor for `id` with an empty validator set.
    pub fn new(id: SubnetId, config: StakingConfig) -> GatewayResult<Self> {
        Ok(Self {
            id,
            staking: StakingService::new(config)?,
            bootstrapped: false,
            last_bottom_up_checkpoint_height: 0,
            last_bottom_up_batch_height: 0,
        })
    }

    /// Subnet id.
    pub fn id(&self) -> &SubnetId {
        &self.id
    }

    /// Validator set and change log.
    pub fn staking(&self) -> &StakingService {
        &self.staking
    }

    /// Whether the subnet reached its bootstrap requirement.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Height of the last accepted checkpoint.
    pub fn last_bottom_up_checkpoint_height(&self) -> ChainEpoch {
        self.last_bottom_up_checkpoint_height
    }

    /// Height of the last accepted batch.
    pub fn last_bottom_up_batch_height(&self) -> ChainEpoch {
        self.last_bottom_up_batch_height
    }

    /// Collateral backing the subnet.
    pub fn stake(&self) -> TokenAmount {
        self.staking.validators().total_confirmed_collateral()
    }

    /// Validators in either set.
    pub fn validator_count(&self) -> usize {
        let validators = self.staking.validators();
        validators.active_count() + validators.waiting_count()
    }

    pub(crate) fn take_events(&mut self) -> Vec<StakingEvent> {
        self.staking.take_events()
    }

    // =========================================================================
    // STAKING
    // =========================================================================

    /// Deposit collateral. Applied at once before bootstrap, deferred after.
    ///
    /// Returns the configuration number of a deferred change and whether
    /// this call bootstrapped the subnet.
    pub fn deposit(
        &mut self,
        validator: Address,
        amount: TokenAmount,
    ) -> GatewayResult<(Option<u64>, bool)> {
        if self.bootstrapped {
            return Ok((Some(self.staking.deposit(validator, amount)?), false));
        }
        self.staking.deposit_with_confirm(validator, amount)?;
        Ok((None, self.try_bootstrap()))
    }

    /// Withdraw collateral. Applied at once before bootstrap, deferred after.
    pub fn withdraw(
        &mut self,
        validator: Address,
        amount: TokenAmount,
        current_height: ChainEpoch,
    ) -> GatewayResult<Option<u64>> {
        if self.bootstrapped {
            return Ok(Some(self.staking.withdraw(validator, amount)?));
        }
        self.staking
            .withdraw_with_confirm(validator, amount, current_height)?;
        Ok(None)
    }

    /// Record new metadata.
    pub fn set_metadata(&mut self, validator: Address, metadata: Vec<u8>) -> GatewayResult<u64> {
        Ok(self.staking.set_metadata(validator, metadata)?)
    }

    /// Assign federated power. Applied at once before bootstrap.
    pub fn set_federated_power(
        &mut self,
        validator: Address,
        metadata: Vec<u8>,
        power: U256,
    ) -> GatewayResult<(Option<u64>, bool)> {
        if self.bootstrapped {
            let number = self
                .staking
                .set_federated_power(validator, metadata, power)?;
            return Ok((Some(number), false));
        }
        self.staking
            .set_federated_power_with_confirm(validator, metadata, power)?;
        Ok((None, self.try_bootstrap()))
    }

    /// Confirm pending changes up to `configuration_number`.
    pub fn confirm_change(
        &mut self,
        configuration_number: u64,
        current_height: ChainEpoch,
    ) -> GatewayResult<()> {
        Ok(self
            .staking
            .confirm_change(configuration_number, current_height)?)
    }

    /// Drain matured releases of `validator`.
    pub fn claim(
        &mut self,
        validator: Address,
        current_height: ChainEpoch,
    ) -> GatewayResult<TokenAmount> {
        Ok(self.staking.claim(validator, current_height)?)
    }

    fn try_bootstrap(&mut self) -> bool {
        let validators = self.staking.validators();
        let ready = match validators.permission_mode() {
            PermissionMode::Federated => !validators.total_active_power().is_zero(),
            PermissionMode::Collateral | PermissionMode::Static => {
                validators.total_confirmed_collateral() >= self.staking.config().min_collateral
            }
        };
        if ready {
            self.bootstrapped = true;
        }
        ready
    }

    // =========================================================================
    // CHECKPOINT SUPPORT
    // =========================================================================

    /// Power of each signer, rejecting inactive and repeated signers.
    pub fn signer_weights(&self, signers: &[Address]) -> GatewayResult<Vec<U256>> {
        let validators = self.staking.validators();
        let mut seen = std::collections::BTreeSet::new();
        signers
            .iter()
            .map(|signer| {
                if !seen.insert(*signer) {
                    return Err(GatewayError::DuplicateSigner { signer: *signer });
                }
                if !validators.is_active(signer) {
                    return Err(GatewayError::NotActiveValidator { signer: *signer });
                }
                Ok(validators.get_power(signer))
            })
            .collect()
    }

    /// Weight a submission needs under `majority_percentage`.
    pub fn weight_threshold(&self, majority_percentage: u8) -> GatewayResult<U256> {
        Ok(weighted_threshold(
            self.staking.validators().total_active_power(),
            majority_percentage,
        )?)
    }

    pub(crate) fn next_checkpoint_height(&self, period: ChainEpoch) -> GatewayResult<ChainEpoch> {
        Ok(self
            .last_bottom_up_checkpoint_height
            .checked_add(period)
            .ok_or(shared_types::ArithmeticError::Overflow)?)
    }

    pub(crate) fn set_last_checkpoint_height(&mut self, height: ChainEpoch) {
        self.last_bottom_up_checkpoint_height = height;
    }

    pub(crate) fn set_last_batch_height(&mut self, height: ChainEpoch) {
        self.last_bottom_up_batch_height = height;
    }
}
