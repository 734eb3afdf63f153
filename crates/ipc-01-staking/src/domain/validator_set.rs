//! # Validator Set
//!
//! Active validators (capacity-limited, weakest at the root so eviction
//! compares against it) and waiting validators (unbounded, strongest at the
//! root so promotion takes it), plus the per-validator records that define
//! their power.
//!
//! Every power change goes through [`ValidatorSet::increase_reshuffle`] or
//! [`ValidatorSet::reduce_reshuffle`], which keep these invariants:
//!
//! - `active.len() <= active_limit`
//! - no address is in both queues
//! - when the active set is full, no waiting validator outranks the weakest
//!   active one after a reduce

use std::collections::HashMap;

use shared_types::{checked_add, checked_sub, Address, TokenAmount, U256};
use tracing::debug;

use crate::domain::priority_queue::{MaxPQ, MinPQ};
use crate::domain::validator::{PermissionMode, ValidatorRecord};
use crate::error::{StakingError, StakingResult};
use crate::events::StakingEvent;

/// Borrow of the records used as the heaps' power function.
struct PowerTable<'a> {
    records: &'a HashMap<Address, ValidatorRecord>,
    mode: PermissionMode,
}

impl PowerTable<'_> {
    fn power(&self, addr: &Address) -> U256 {
        self.records
            .get(addr)
            .map(|r| r.power(self.mode))
            .unwrap_or_default()
    }
}

/// Validator membership and collateral.
#[derive(Debug, Clone)]
pub struct ValidatorSet {
    permission_mode: PermissionMode,
    active_limit: u16,
    total_confirmed_collateral: TokenAmount,
    validators: HashMap<Address, ValidatorRecord>,
    active: MinPQ,
    waiting: MaxPQ,
}

impl ValidatorSet {
    /// Empty set.
    pub fn new(permission_mode: PermissionMode, active_limit: u16) -> Self {
        Self {
            permission_mode,
            active_limit,
            total_confirmed_collateral: TokenAmount::zero(),
            validators: HashMap::new(),
            active: MinPQ::new(),
            waiting: MaxPQ::new(),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Permission mode.
    pub fn permission_mode(&self) -> PermissionMode {
        self.permission_mode
    }

    /// Maximum number of active validators.
    pub fn active_limit(&self) -> u16 {
        self.active_limit
    }

    /// Power of `addr` under the set's permission mode.
    pub fn get_power(&self, addr: &Address) -> U256 {
        self.power_table().power(addr)
    }

    /// Record for `addr`.
    pub fn validator(&self, addr: &Address) -> Option<&ValidatorRecord> {
        self.validators.get(addr)
    }

    /// Sum of confirmed collateral over all validators.
    pub fn total_confirmed_collateral(&self) -> TokenAmount {
        self.total_confirmed_collateral
    }

    /// Whether `addr` is active.
    pub fn is_active(&self, addr: &Address) -> bool {
        self.active.contains(addr)
    }

    /// Whether `addr` is waiting.
    pub fn is_waiting(&self, addr: &Address) -> bool {
        self.waiting.contains(addr)
    }

    /// Number of active validators.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of waiting validators.
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Active validators with their power, in heap order.
    pub fn active_validators(&self) -> Vec<(Address, U256)> {
        let table = self.power_table();
        self.active.iter().map(|a| (*a, table.power(a))).collect()
    }

    /// Waiting validators with their power, in heap order.
    pub fn waiting_validators(&self) -> Vec<(Address, U256)> {
        let table = self.power_table();
        self.waiting.iter().map(|a| (*a, table.power(a))).collect()
    }

    /// Sum of active power, saturating.
    pub fn total_active_power(&self) -> U256 {
        self.active_validators()
            .into_iter()
            .fold(U256::zero(), |acc, (_, p)| acc.saturating_add(p))
    }

    /// Weakest active validator and its power.
    pub fn min_active(&self) -> Option<(Address, U256)> {
        let table = self.power_table();
        self.active.root_with_power(|a| table.power(a))
    }

    /// Strongest waiting validator and its power.
    pub fn max_waiting(&self) -> Option<(Address, U256)> {
        let table = self.power_table();
        self.waiting.root_with_power(|a| table.power(a))
    }

    fn power_table(&self) -> PowerTable<'_> {
        PowerTable {
            records: &self.validators,
            mode: self.permission_mode,
        }
    }

    // =========================================================================
    // SPECULATIVE BOOKKEEPING
    // =========================================================================

    /// Add to the pending collateral of `addr`, creating its record.
    pub fn record_deposit(&mut self, addr: Address, amount: TokenAmount) -> StakingResult<()> {
        let record = self.validators.entry(addr).or_default();
        record.total_collateral = checked_add(record.total_collateral, amount)?;
        Ok(())
    }

    /// Subtract from the pending collateral of `addr`.
    pub fn record_withdraw(&mut self, addr: &Address, amount: TokenAmount) -> StakingResult<()> {
        let record = self
            .validators
            .get_mut(addr)
            .ok_or(StakingError::NotValidator { validator: *addr })?;
        if amount > record.total_collateral {
            return Err(StakingError::NotEnoughCollateral {
                requested: amount,
                available: record.total_collateral,
            });
        }
        record.total_collateral = checked_sub(record.total_collateral, amount)?;
        Ok(())
    }

    // =========================================================================
    // CONFIRMED CHANGES
    // =========================================================================

    /// Apply a confirmed deposit.
    pub fn confirm_deposit(
        &mut self,
        addr: Address,
        amount: TokenAmount,
        events: &mut Vec<StakingEvent>,
    ) -> StakingResult<()> {
        let record = self.validators.entry(addr).or_default();
        record.confirmed_collateral = checked_add(record.confirmed_collateral, amount)?;
        self.total_confirmed_collateral = checked_add(self.total_confirmed_collateral, amount)?;

        let new_power = self.get_power(&addr);
        self.increase_reshuffle(addr, new_power, events)
    }

    /// Apply a confirmed withdrawal. Deletes the record once nothing is left.
    pub fn confirm_withdraw(
        &mut self,
        addr: Address,
        amount: TokenAmount,
        events: &mut Vec<StakingEvent>,
    ) -> StakingResult<()> {
        let record = self
            .validators
            .get_mut(&addr)
            .ok_or(StakingError::NotValidator { validator: addr })?;
        if amount > record.confirmed_collateral {
            return Err(StakingError::NotEnoughCollateral {
                requested: amount,
                available: record.confirmed_collateral,
            });
        }
        record.confirmed_collateral = checked_sub(record.confirmed_collateral, amount)?;
        let remove = record.is_empty();
        self.total_confirmed_collateral = checked_sub(self.total_confirmed_collateral, amount)?;

        let new_power = self.get_power(&addr);
        self.reduce_reshuffle(addr, new_power, events)?;
        if remove {
            debug!(validator = %addr, "Validator record deleted");
            self.validators.remove(&addr);
        }
        Ok(())
    }

    /// Apply a confirmed federated power assignment.
    ///
    /// Equal power only updates metadata.
    pub fn confirm_federated_power(
        &mut self,
        addr: Address,
        metadata: Vec<u8>,
        power: U256,
        events: &mut Vec<StakingEvent>,
    ) -> StakingResult<()> {
        let record = self.validators.entry(addr).or_default();
        if !metadata.is_empty() {
            record.metadata = metadata;
        }
        let existing = record.federated_power;
        record.federated_power = power;

        if existing == power {
            return Ok(());
        }
        if existing < power {
            self.increase_reshuffle(addr, power, events)
        } else {
            self.reduce_reshuffle(addr, power, events)
        }
    }

    /// Replace the metadata of `addr`. Addresses without a record are skipped.
    pub fn set_metadata(&mut self, addr: Address, metadata: Vec<u8>) {
        match self.validators.get_mut(&addr) {
            Some(record) => record.metadata = metadata,
            None => debug!(validator = %addr, "Metadata for unknown validator skipped"),
        }
    }

    // =========================================================================
    // RESHUFFLE
    // =========================================================================

    /// Re-seat `addr` after its power grew to `new_power`.
    pub fn increase_reshuffle(
        &mut self,
        addr: Address,
        new_power: U256,
        events: &mut Vec<StakingEvent>,
    ) -> StakingResult<()> {
        let table = PowerTable {
            records: &self.validators,
            mode: self.permission_mode,
        };
        let power = |a: &Address| table.power(a);

        if self.active.contains(&addr) {
            self.active.increase_reheapify(&addr, power)?;
            events.push(StakingEvent::ActiveValidatorCollateralUpdated {
                validator: addr,
                power: new_power,
            });
            return Ok(());
        }

        if self.active.len() < usize::from(self.active_limit) {
            if self.waiting.contains(&addr) {
                self.waiting.delete_reheapify(&addr, power)?;
            }
            self.active.insert(addr, power)?;
            events.push(StakingEvent::NewActiveValidator {
                validator: addr,
                power: new_power,
            });
            return Ok(());
        }

        if let Some((weakest, weakest_power)) = self.active.root_with_power(power) {
            if weakest_power < new_power {
                if self.waiting.contains(&addr) {
                    self.waiting.delete_reheapify(&addr, power)?;
                }
                self.active.pop(power)?;
                self.active.insert(addr, power)?;
                self.waiting.insert(weakest, power)?;
                events.push(StakingEvent::ActiveValidatorReplaced {
                    old_validator: weakest,
                    new_validator: addr,
                });
                return Ok(());
            }
        }

        if self.waiting.contains(&addr) {
            self.waiting.increase_reheapify(&addr, power)?;
            events.push(StakingEvent::WaitingValidatorCollateralUpdated {
                validator: addr,
                power: new_power,
            });
            return Ok(());
        }

        self.waiting.insert(addr, power)?;
        events.push(StakingEvent::NewWaitingValidator {
            validator: addr,
            power: new_power,
        });
        Ok(())
    }

    /// Re-seat `addr` after its power shrank to `new_power`.
    pub fn reduce_reshuffle(
        &mut self,
        addr: Address,
        new_power: U256,
        events: &mut Vec<StakingEvent>,
    ) -> StakingResult<()> {
        let table = PowerTable {
            records: &self.validators,
            mode: self.permission_mode,
        };
        let power = |a: &Address| table.power(a);

        if self.active.contains(&addr) {
            if new_power.is_zero() {
                self.active.delete_reheapify(&addr, power)?;
                events.push(StakingEvent::ActiveValidatorLeft { validator: addr });

                if !self.waiting.is_empty() {
                    let promoted = self.waiting.pop(power)?;
                    self.active.insert(promoted, power)?;
                    events.push(StakingEvent::NewActiveValidator {
                        validator: promoted,
                        power: table.power(&promoted),
                    });
                }
                return Ok(());
            }

            self.active.decrease_reheapify(&addr, power)?;

            let swap = match (
                self.active.root_with_power(power),
                self.waiting.root_with_power(power),
            ) {
                (Some((weakest, weakest_power)), Some((strongest, strongest_power)))
                    if weakest_power < strongest_power =>
                {
                    Some((weakest, strongest))
                }
                _ => None,
            };

            match swap {
                Some((weakest, strongest)) => {
                    self.active.pop(power)?;
                    self.waiting.pop(power)?;
                    self.active.insert(strongest, power)?;
                    self.waiting.insert(weakest, power)?;
                    events.push(StakingEvent::ActiveValidatorReplaced {
                        old_validator: weakest,
                        new_validator: strongest,
                    });
                }
                None => events.push(StakingEvent::ActiveValidatorCollateralUpdated {
                    validator: addr,
                    power: new_power,
                }),
            }
            return Ok(());
        }

        if self.waiting.contains(&addr) {
            if new_power.is_zero() {
                self.waiting.delete_reheapify(&addr, power)?;
                events.push(StakingEvent::WaitingValidatorLeft { validator: addr });
                return Ok(());
            }
            self.waiting.decrease_reheapify(&addr, power)?;
            events.push(StakingEvent::WaitingValidatorCollateralUpdated {
                validator: addr,
                power: new_power,
            });
            return Ok(());
        }

        Err(StakingError::NotValidator { validator: addr })
    }
}
