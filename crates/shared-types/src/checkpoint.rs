//! # Checkpoints and Message Batches
//!
//! Objects a child subnet's validators certify and submit to the parent.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::cross::{encode, IpcEnvelope};
use crate::errors::EncodingError;
use crate::primitives::{ChainEpoch, Hash};
use crate::subnet_id::SubnetId;

/// Kind of object a quorum certifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuorumObjKind {
    /// A bottom-up checkpoint.
    Checkpoint,
    /// A size-triggered bottom-up message batch.
    BottomUpMsgBatch,
}

/// Periodic certified summary of a child subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomUpCheckpoint {
    /// Subnet the checkpoint belongs to.
    pub subnet_id: SubnetId,
    /// Height the checkpoint was cut at.
    pub block_height: ChainEpoch,
    /// Block hash at that height.
    pub block_hash: Hash,
    /// First configuration number the parent has not yet confirmed.
    pub next_configuration_number: u64,
    /// Bottom-up messages released by the checkpoint.
    pub msgs: Vec<IpcEnvelope>,
}

impl BottomUpCheckpoint {
    /// Hash the validators sign.
    pub fn to_hash(&self) -> Result<Hash, EncodingError> {
        Ok(Hash(Keccak256::digest(encode(self)?).into()))
    }
}

/// A batch of bottom-up messages released between checkpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomUpMsgBatch {
    /// Subnet the batch belongs to.
    pub subnet_id: SubnetId,
    /// Height the batch was cut at.
    pub block_height: ChainEpoch,
    /// Messages in commit order.
    pub msgs: Vec<IpcEnvelope>,
}

impl BottomUpMsgBatch {
    /// Empty batch for `subnet_id` at `block_height`.
    #[must_use]
    pub fn new(subnet_id: SubnetId, block_height: ChainEpoch) -> Self {
        Self {
            subnet_id,
            block_height,
            msgs: Vec::new(),
        }
    }

    /// Hash the validators sign.
    pub fn to_hash(&self) -> Result<Hash, EncodingError> {
        Ok(Hash(Keccak256::digest(encode(self)?).into()))
    }
}
