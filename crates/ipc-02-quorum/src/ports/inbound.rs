//! Driving Ports (API - Inbound)

use shared_types::{Address, ChainEpoch, Hash, QuorumObjKind, U256};

use crate::domain::QuorumInfo;
use crate::error::QuorumResult;

/// Certification API over checkpoints and message batches.
pub trait QuorumApi {
    /// Open a quorum for an object at `height`.
    fn create_quorum_info(
        &mut self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        object_hash: Hash,
        membership_root: Hash,
        membership_weight: U256,
    ) -> QuorumResult<()>;

    /// Count a member signature. Returns the recovered signer.
    fn add_quorum_signature(
        &mut self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        membership_proof: &[Hash],
        weight: U256,
        signature: &[u8],
    ) -> QuorumResult<Address>;

    /// Drop every quorum below `retention_height`.
    fn prune_quorums(&mut self, kind: QuorumObjKind, retention_height: ChainEpoch)
        -> QuorumResult<()>;

    /// Quorum at `height`.
    fn quorum_info(&self, kind: QuorumObjKind, height: ChainEpoch) -> Option<&QuorumInfo>;
}
