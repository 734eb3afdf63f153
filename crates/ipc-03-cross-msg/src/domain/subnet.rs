//! Registered child subnets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared_types::{Address, ChainEpoch, SubnetId, TokenAmount};

use crate::error::{RouterError, RouterResult};

/// What backs the value a subnet moves across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SupplyKind {
    /// Native currency of the parent.
    #[default]
    Native,
    /// Exchangeable token held by the parent.
    Token {
        /// Token contract.
        address: Address,
    },
}

impl SupplyKind {
    /// True for token-backed supply.
    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token { .. })
    }
}

/// Parent-side view of a child subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Subnet path.
    pub id: SubnetId,
    /// Collateral the child's validators hold at the parent.
    pub stake: TokenAmount,
    /// Height of registration.
    pub genesis_epoch: ChainEpoch,
    /// Next nonce for top-down messages to this child.
    pub top_down_nonce: u64,
    /// Next bottom-up nonce expected from this child.
    pub applied_bottom_up_nonce: u64,
    /// Value funded into the child and not yet released.
    pub circ_supply: TokenAmount,
    /// Value backing.
    pub supply_source: SupplyKind,
}

impl Subnet {
    /// Fresh subnet with zeroed counters.
    pub fn new(
        id: SubnetId,
        supply_source: SupplyKind,
        stake: TokenAmount,
        genesis_epoch: ChainEpoch,
    ) -> Self {
        Self {
            id,
            stake,
            genesis_epoch,
            top_down_nonce: 0,
            applied_bottom_up_nonce: 0,
            circ_supply: TokenAmount::zero(),
            supply_source,
        }
    }
}

/// Child subnets keyed by path.
#[derive(Debug, Clone, Default)]
pub struct SubnetRegistry {
    subnets: HashMap<SubnetId, Subnet>,
}

impl SubnetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `subnet`; its id must be new.
    pub fn register(&mut self, subnet: Subnet) -> RouterResult<()> {
        if self.subnets.contains_key(&subnet.id) {
            return Err(RouterError::AlreadyRegisteredSubnet { subnet: subnet.id });
        }
        self.subnets.insert(subnet.id.clone(), subnet);
        Ok(())
    }

    /// Remove `id` and return it.
    pub fn remove(&mut self, id: &SubnetId) -> RouterResult<Subnet> {
        self.subnets
            .remove(id)
            .ok_or_else(|| RouterError::NotRegisteredSubnet { subnet: id.clone() })
    }

    /// Subnet `id`.
    pub fn get(&self, id: &SubnetId) -> Option<&Subnet> {
        self.subnets.get(id)
    }

    /// Subnet `id`, or `NotRegisteredSubnet`.
    pub fn get_mut(&mut self, id: &SubnetId) -> RouterResult<&mut Subnet> {
        self.subnets
            .get_mut(id)
            .ok_or_else(|| RouterError::NotRegisteredSubnet { subnet: id.clone() })
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &SubnetId) -> bool {
        self.subnets.contains_key(id)
    }

    /// Number of registered subnets.
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    /// All subnets, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Subnet> {
        self.subnets.values()
    }
}
