//! # Subnet Identity
//!
//! A subnet is named by the root chain id plus the route of subnet-actor
//! addresses leading from the root down to it: `/r314159/0xab../0xcd..`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;
use crate::primitives::Address;

/// Path of a subnet in the hierarchy.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SubnetId {
    /// Chain id of the root network.
    pub root: u64,
    /// Subnet-actor addresses from the root down.
    pub route: Vec<Address>,
}

impl SubnetId {
    /// Creates a subnet id from its parts.
    #[must_use]
    pub fn new(root: u64, route: Vec<Address>) -> Self {
        Self { root, route }
    }

    /// Root network with no route.
    #[must_use]
    pub fn new_root(root: u64) -> Self {
        Self {
            root,
            route: Vec::new(),
        }
    }

    /// The child of `parent` governed by the subnet actor `actor`.
    #[must_use]
    pub fn child_of(parent: &SubnetId, actor: Address) -> Self {
        let mut route = parent.route.clone();
        route.push(actor);
        Self {
            root: parent.root,
            route,
        }
    }

    /// Undefined subnet: zero root and no route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root == 0 && self.route.is_empty()
    }

    /// True for the root of the hierarchy.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.route.is_empty()
    }

    /// Subnet actor governing this subnet, if any.
    #[must_use]
    pub fn subnet_actor(&self) -> Option<Address> {
        self.route.last().copied()
    }

    /// The parent subnet; `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<SubnetId> {
        let (_, prefix) = self.route.split_last()?;
        Some(SubnetId::new(self.root, prefix.to_vec()))
    }

    /// Length of the shared route prefix, `None` when roots differ.
    #[must_use]
    pub fn common_prefix_len(&self, other: &SubnetId) -> Option<usize> {
        if self.root != other.root {
            return None;
        }
        Some(
            self.route
                .iter()
                .zip(&other.route)
                .take_while(|(a, b)| a == b)
                .count(),
        )
    }

    /// Lowest common ancestor of the two subnets.
    #[must_use]
    pub fn common_parent(&self, other: &SubnetId) -> Option<SubnetId> {
        let common = self.common_prefix_len(other)?;
        Some(SubnetId::new(self.root, self.route[..common].to_vec()))
    }

    /// Next hop when travelling from `from` down towards `self`.
    #[must_use]
    pub fn down(&self, from: &SubnetId) -> Option<SubnetId> {
        if self.route.len() <= from.route.len() {
            return None;
        }
        let common = self.common_prefix_len(from)?;
        Some(SubnetId::new(self.root, self.route[..=common].to_vec()))
    }

    /// Next hop when travelling from `from` up towards the common ancestor.
    #[must_use]
    pub fn up(&self, from: &SubnetId) -> Option<SubnetId> {
        if self.route.len() < from.route.len() {
            return None;
        }
        let common = self.common_prefix_len(from)?;
        let end = common.checked_sub(1)?;
        Some(SubnetId::new(self.root, self.route[..end].to_vec()))
    }

    /// Whether `other` is the direct parent or a direct child of `self`.
    #[must_use]
    pub fn is_neighbour(&self, other: &SubnetId) -> bool {
        self.parent().as_ref() == Some(other) || other.parent().as_ref() == Some(self)
    }
}

impl fmt::Display for SubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/r{}", self.root)?;
        for actor in &self.route {
            write!(f, "/{actor}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubnetId({self})")
    }
}

impl FromStr for SubnetId {
    type Err = ParseError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ParseError::InvalidSubnetId {
            input: id.to_string(),
            reason,
        };

        let rest = id
            .strip_prefix("/r")
            .ok_or_else(|| invalid("expected to start with '/r'".into()))?;
        let mut segments = rest.split('/');
        let root = segments
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| invalid("invalid root id".into()))?;

        let route = segments
            .map(|segment| {
                segment
                    .parse::<Address>()
                    .map_err(|e| invalid(format!("invalid route address {segment}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { root, route })
    }
}
