//! Events emitted by the certifier.

use serde::{Deserialize, Serialize};
use shared_types::{ChainEpoch, Hash, QuorumObjKind, TokenAmount};

/// Certification progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumEvent {
    /// Weight crossed the threshold for the first time.
    QuorumReached {
        kind: QuorumObjKind,
        height: ChainEpoch,
        object_hash: Hash,
        weight: TokenAmount,
    },
    /// Weight grew after the quorum was already reached.
    QuorumWeightUpdated {
        kind: QuorumObjKind,
        height: ChainEpoch,
        object_hash: Hash,
        weight: TokenAmount,
    },
}

impl QuorumEvent {
    /// Height the event refers to.
    pub fn height(&self) -> ChainEpoch {
        match self {
            Self::QuorumReached { height, .. } | Self::QuorumWeightUpdated { height, .. } => {
                *height
            }
        }
    }
}
