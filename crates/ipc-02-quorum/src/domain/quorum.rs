//! # Quorum Map
//!
//! Per-height signature accumulation against a Merkle-committed weighted
//! membership. One map exists per certified object kind.
//!
//! ```text
//! create_quorum_info(h) ──→ add_quorum_signature(h, ..)* ──→ reached ──→ prune_quorums(> h)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared_crypto::{membership_leaf, recover_address, verify_proof};
use shared_types::{checked_add, weighted_threshold, Address, ChainEpoch, Hash, QuorumObjKind, U256};
use tracing::{debug, info};

use crate::error::{QuorumError, QuorumResult};
use crate::events::QuorumEvent;

/// Certification state of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumInfo {
    /// Hash the validators sign.
    pub object_hash: Hash,
    /// Root of the membership snapshot signers prove against.
    pub membership_root: Hash,
    /// Weight needed to certify.
    pub threshold: U256,
    /// Weight collected so far.
    pub current_weight: U256,
    /// Set once `current_weight >= threshold`, never cleared.
    pub reached: bool,
}

/// Quorums of one object kind, keyed by height.
#[derive(Debug, Clone)]
pub struct QuorumMap {
    kind: QuorumObjKind,
    retention_height: ChainEpoch,
    incomplete: BTreeSet<ChainEpoch>,
    infos: BTreeMap<ChainEpoch, QuorumInfo>,
    signatures: BTreeMap<ChainEpoch, BTreeMap<Address, Vec<u8>>>,
}

impl QuorumMap {
    /// Empty map with retention height zero.
    pub fn new(kind: QuorumObjKind) -> Self {
        Self {
            kind,
            retention_height: 0,
            incomplete: BTreeSet::new(),
            infos: BTreeMap::new(),
            signatures: BTreeMap::new(),
        }
    }

    /// Object kind this map certifies.
    pub fn kind(&self) -> QuorumObjKind {
        self.kind
    }

    /// Lowest height still tracked.
    pub fn retention_height(&self) -> ChainEpoch {
        self.retention_height
    }

    /// Heights whose quorum is not reached yet, ascending.
    pub fn incomplete_heights(&self) -> Vec<ChainEpoch> {
        self.incomplete.iter().copied().collect()
    }

    /// Quorum at `height`.
    pub fn quorum_info(&self, height: ChainEpoch) -> Option<&QuorumInfo> {
        self.infos.get(&height)
    }

    /// Whether the quorum at `height` is reached.
    pub fn is_reached(&self, height: ChainEpoch) -> bool {
        self.infos.get(&height).is_some_and(|info| info.reached)
    }

    /// Signers and signatures collected at `height`, ordered by signer.
    pub fn signatures(&self, height: ChainEpoch) -> Vec<(Address, Vec<u8>)> {
        self.signatures
            .get(&height)
            .map(|sigs| sigs.iter().map(|(a, s)| (*a, s.clone())).collect())
            .unwrap_or_default()
    }

    /// Whether `signer` already signed at `height`.
    pub fn has_signed(&self, height: ChainEpoch, signer: &Address) -> bool {
        self.signatures
            .get(&height)
            .is_some_and(|sigs| sigs.contains_key(signer))
    }

    /// Open a quorum for `object_hash` at `height`.
    pub fn create_quorum_info(
        &mut self,
        height: ChainEpoch,
        object_hash: Hash,
        membership_root: Hash,
        membership_weight: U256,
        majority_percentage: u8,
    ) -> QuorumResult<()> {
        if height < self.retention_height {
            return Err(QuorumError::QuorumAlreadyProcessed {
                height,
                retention_height: self.retention_height,
            });
        }
        if membership_weight.is_zero() {
            return Err(QuorumError::ZeroMembershipWeight { height });
        }
        if self.infos.contains_key(&height) {
            return Err(QuorumError::QuorumAlreadyExists { height });
        }

        let threshold = weighted_threshold(membership_weight, majority_percentage)?;
        self.infos.insert(
            height,
            QuorumInfo {
                object_hash,
                membership_root,
                threshold,
                current_weight: U256::zero(),
                reached: false,
            },
        );
        self.incomplete.insert(height);

        debug!(kind = ?self.kind, height, %threshold, "Quorum created");
        Ok(())
    }

    /// Count the signature of a member at `height`.
    ///
    /// The signer is recovered from `signature` over the object hash and must
    /// prove `(signer, weight)` against the membership root.
    pub fn add_quorum_signature(
        &mut self,
        height: ChainEpoch,
        membership_proof: &[Hash],
        weight: U256,
        signature: &[u8],
        events: &mut Vec<QuorumEvent>,
    ) -> QuorumResult<Address> {
        let info = self
            .infos
            .get(&height)
            .ok_or(QuorumError::QuorumNotFound { height })?;

        let signer = recover_address(info.object_hash.as_bytes(), signature)?;
        if self.has_signed(height, &signer) {
            return Err(QuorumError::SignatureReplay { height, signer });
        }

        let leaf = membership_leaf(&signer, weight);
        if !verify_proof(&info.membership_root, &leaf, membership_proof) {
            return Err(QuorumError::NotAuthorized {
                height,
                signer,
                weight,
            });
        }

        let current_weight = checked_add(info.current_weight, weight)?;

        self.signatures
            .entry(height)
            .or_default()
            .insert(signer, signature.to_vec());

        let kind = self.kind;
        let info = self
            .infos
            .get_mut(&height)
            .ok_or(QuorumError::QuorumNotFound { height })?;
        info.current_weight = current_weight;

        if info.reached {
            events.push(QuorumEvent::QuorumWeightUpdated {
                kind,
                height,
                object_hash: info.object_hash,
                weight: current_weight,
            });
        } else if current_weight >= info.threshold {
            info.reached = true;
            self.incomplete.remove(&height);
            info!(?kind, height, weight = %current_weight, "Quorum reached");
            events.push(QuorumEvent::QuorumReached {
                kind,
                height,
                object_hash: info.object_hash,
                weight: current_weight,
            });
        } else {
            debug!(?kind, height, %signer, weight = %current_weight, "Signature counted");
        }

        Ok(signer)
    }

    /// Forget every height below `new_retention_height`.
    pub fn prune_quorums(&mut self, new_retention_height: ChainEpoch) -> QuorumResult<()> {
        if new_retention_height <= self.retention_height {
            return Err(QuorumError::InvalidRetentionHeight {
                requested: new_retention_height,
                current: self.retention_height,
            });
        }

        let kept_infos = self.infos.split_off(&new_retention_height);
        let pruned = self.infos.len();
        self.infos = kept_infos;
        self.signatures = self.signatures.split_off(&new_retention_height);
        self.incomplete = self.incomplete.split_off(&new_retention_height);

        debug!(
            kind = ?self.kind,
            from = self.retention_height,
            to = new_retention_height,
            pruned,
            "Quorums pruned"
        );
        self.retention_height = new_retention_height;
        Ok(())
    }
}
