//! # Release Queue
//!
//! Confirmed withdrawals are locked for `locking_duration` blocks before the
//! validator can claim them. Releases for one validator are appended with
//! non-decreasing `release_at`, so a claim can stop at the first entry that
//! is not yet due.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use shared_types::{checked_add, Address, ArithmeticError, ChainEpoch, TokenAmount};

/// A locked amount and the height it unlocks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingRelease {
    /// First height at which the amount can be claimed.
    pub release_at: ChainEpoch,
    /// Amount locked.
    pub amount: TokenAmount,
}

/// Locked withdrawals per validator.
#[derive(Debug, Clone, Default)]
pub struct StakingReleaseQueue {
    locking_duration: ChainEpoch,
    releases: HashMap<Address, VecDeque<StakingRelease>>,
}

impl StakingReleaseQueue {
    /// Empty queue.
    pub fn new(locking_duration: ChainEpoch) -> Self {
        Self {
            locking_duration,
            releases: HashMap::new(),
        }
    }

    /// Blocks a withdrawal stays locked.
    pub fn locking_duration(&self) -> ChainEpoch {
        self.locking_duration
    }

    /// Pending releases of `validator`, oldest first.
    pub fn pending(&self, validator: &Address) -> Vec<StakingRelease> {
        self.releases
            .get(validator)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Lock `amount` for `validator` until `current_height + locking_duration`.
    pub fn add_new_release(
        &mut self,
        validator: Address,
        amount: TokenAmount,
        current_height: ChainEpoch,
    ) -> Result<StakingRelease, ArithmeticError> {
        let release_at = current_height
            .checked_add(self.locking_duration)
            .ok_or(ArithmeticError::Overflow)?;
        let release = StakingRelease { release_at, amount };
        self.releases.entry(validator).or_default().push_back(release);
        Ok(release)
    }

    /// Drain every release of `validator` due at `current_height`.
    ///
    /// Returns `None` if the validator has nothing queued, otherwise the
    /// aggregated amount, which is zero when nothing is due yet.
    pub fn claim(
        &mut self,
        validator: &Address,
        current_height: ChainEpoch,
    ) -> Result<Option<TokenAmount>, ArithmeticError> {
        let Some(queue) = self.releases.get_mut(validator) else {
            return Ok(None);
        };
        if queue.is_empty() {
            return Ok(None);
        }

        let mut amount = TokenAmount::zero();
        while let Some(release) = queue.front() {
            if release.release_at > current_height {
                break;
            }
            amount = checked_add(amount, release.amount)?;
            queue.pop_front();
        }

        if queue.is_empty() {
            self.releases.remove(validator);
        }
        Ok(Some(amount))
    }
}
