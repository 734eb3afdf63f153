//! Certifier Service
//!
//! Holds one quorum map per certified object kind and applies the configured
//! majority to every quorum it opens.

use shared_types::{Address, ChainEpoch, Hash, QuorumObjKind, U256};

use crate::config::QuorumConfig;
use crate::domain::{QuorumInfo, QuorumMap};
use crate::error::QuorumResult;
use crate::events::QuorumEvent;
use crate::ports::inbound::QuorumApi;

/// Checkpoint and batch quorums of one subnet.
#[derive(Debug, Clone)]
pub struct CertifierService {
    config: QuorumConfig,
    checkpoints: QuorumMap,
    batches: QuorumMap,
    pending_events: Vec<QuorumEvent>,
}

impl CertifierService {
    /// Create a certifier from a validated config.
    pub fn new(config: QuorumConfig) -> QuorumResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            checkpoints: QuorumMap::new(QuorumObjKind::Checkpoint),
            batches: QuorumMap::new(QuorumObjKind::BottomUpMsgBatch),
            pending_events: Vec::new(),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &QuorumConfig {
        &self.config
    }

    /// Map for `kind`.
    pub fn map(&self, kind: QuorumObjKind) -> &QuorumMap {
        match kind {
            QuorumObjKind::Checkpoint => &self.checkpoints,
            QuorumObjKind::BottomUpMsgBatch => &self.batches,
        }
    }

    fn map_mut(&mut self, kind: QuorumObjKind) -> &mut QuorumMap {
        match kind {
            QuorumObjKind::Checkpoint => &mut self.checkpoints,
            QuorumObjKind::BottomUpMsgBatch => &mut self.batches,
        }
    }

    /// Take events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<QuorumEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

impl QuorumApi for CertifierService {
    fn create_quorum_info(
        &mut self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        object_hash: Hash,
        membership_root: Hash,
        membership_weight: U256,
    ) -> QuorumResult<()> {
        let majority = self.config.majority_percentage;
        self.map_mut(kind).create_quorum_info(
            height,
            object_hash,
            membership_root,
            membership_weight,
            majority,
        )
    }

    fn add_quorum_signature(
        &mut self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        membership_proof: &[Hash],
        weight: U256,
        signature: &[u8],
    ) -> QuorumResult<Address> {
        let map = match kind {
            QuorumObjKind::Checkpoint => &mut self.checkpoints,
            QuorumObjKind::BottomUpMsgBatch => &mut self.batches,
        };
        map.add_quorum_signature(
            height,
            membership_proof,
            weight,
            signature,
            &mut self.pending_events,
        )
    }

    fn prune_quorums(
        &mut self,
        kind: QuorumObjKind,
        retention_height: ChainEpoch,
    ) -> QuorumResult<()> {
        self.map_mut(kind).prune_quorums(retention_height)
    }

    fn quorum_info(&self, kind: QuorumObjKind, height: ChainEpoch) -> Option<&QuorumInfo> {
        self.map(kind).quorum_info(height)
    }
}
