//! # Checkpointing
//!
//! Parent side: certified checkpoints and batches of a child are verified
//! against the child's active validators, then settle their messages and
//! confirm pending staking changes.
//!
//! Child side: the local network cuts checkpoints from its bottom-up
//! batches and collects member signatures over them.
//!
//! ```text
//! child:  create_bottom_up_checkpoint ─→ add_quorum_signature ×n ─→ QuorumReached
//!                                                                      │ relayer
//! parent: submit_checkpoint ─→ multisig ─→ exec_bottom_up_msgs ─→ confirm_change
//! ```

use ipc_02_quorum::{is_valid_weighted_multisignature, QuorumApi, QuorumInfo};
use ipc_03_cross_msg::{ApplyOutcome, HandlerRegistry};
use shared_types::{
    Address, BottomUpCheckpoint, BottomUpMsgBatch, ChainEpoch, Hash, QuorumObjKind, U256,
};
use tracing::{debug, info};

use super::GatewayState;
use crate::adapters::GatewayEnv;
use crate::error::{GatewayError, GatewayResult};
use crate::events::GatewayEvent;

impl GatewayState {
    // =========================================================================
    // PARENT SIDE
    // =========================================================================

    /// Accept the next checkpoint of a child subnet.
    ///
    /// Requires the height right after the last accepted checkpoint, at most
    /// `max_msgs_per_batch` messages and signatures from distinct active
    /// validators whose power meets the majority of the active power.
    pub fn submit_checkpoint(
        &mut self,
        checkpoint: BottomUpCheckpoint,
        signers: &[Address],
        signatures: &[Vec<u8>],
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<Vec<ApplyOutcome>> {
        let subnet = checkpoint.subnet_id.clone();
        let period = self.config.router.bottom_up_check_period;
        let actor = self.actor_ref(&subnet)?;
        if !actor.is_bootstrapped() {
            return Err(GatewayError::NotBootstrapped { subnet });
        }

        let expected = actor.next_checkpoint_height(period)?;
        if checkpoint.block_height != expected {
            return Err(GatewayError::InvalidCheckpointHeight {
                expected,
                got: checkpoint.block_height,
            });
        }
        self.check_msg_count(checkpoint.msgs.len())?;
        self.verify_signatures(
            &subnet,
            &checkpoint.to_hash()?,
            signers,
            signatures,
        )?;

        let BottomUpCheckpoint {
            block_height,
            next_configuration_number,
            msgs,
            ..
        } = checkpoint;

        self.actor_mut(&subnet)?
            .set_last_checkpoint_height(block_height);
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        let outcomes = self
            .router
            .exec_bottom_up_msgs(&subnet, msgs, current_height, &mut env)?;

        if next_configuration_number > 1 {
            self.confirm_change(&subnet, next_configuration_number - 1, current_height)?;
        }

        info!(
            subnet = %subnet,
            height = block_height,
            next_configuration_number,
            msgs = outcomes.len(),
            "Checkpoint submitted"
        );
        self.events.push(GatewayEvent::CheckpointSubmitted {
            subnet,
            height: block_height,
            next_configuration_number,
        });
        Ok(outcomes)
    }

    /// Accept a size-triggered batch of a child subnet.
    pub fn submit_bottom_up_msg_batch(
        &mut self,
        batch: BottomUpMsgBatch,
        signers: &[Address],
        signatures: &[Vec<u8>],
        current_height: ChainEpoch,
        handlers: &HandlerRegistry,
    ) -> GatewayResult<Vec<ApplyOutcome>> {
        let subnet = batch.subnet_id.clone();
        let actor = self.actor_ref(&subnet)?;
        if !actor.is_bootstrapped() {
            return Err(GatewayError::NotBootstrapped { subnet });
        }
        if batch.msgs.is_empty() {
            return Err(GatewayError::InvalidBatch {
                height: batch.block_height,
                reason: "batch is empty",
            });
        }
        if batch.block_height <= actor.last_bottom_up_batch_height() {
            return Err(GatewayError::InvalidBatch {
                height: batch.block_height,
                reason: "batch height already submitted",
            });
        }
        self.check_msg_count(batch.msgs.len())?;
        self.verify_signatures(&subnet, &batch.to_hash()?, signers, signatures)?;

        let BottomUpMsgBatch {
            block_height, msgs, ..
        } = batch;
        self.actor_mut(&subnet)?.set_last_batch_height(block_height);
        let mut env = GatewayEnv::new(&mut self.ledgers, handlers);
        let outcomes = self
            .router
            .exec_bottom_up_msgs(&subnet, msgs, current_height, &mut env)?;

        info!(subnet = %subnet, height = block_height, msgs = outcomes.len(), "Bottom-up batch submitted");
        self.events.push(GatewayEvent::BottomUpBatchSubmitted {
            subnet,
            height: block_height,
        });
        Ok(outcomes)
    }

    fn check_msg_count(&self, count: usize) -> GatewayResult<()> {
        let max = self.config.router.max_msgs_per_batch;
        if count > max {
            return Err(GatewayError::TooManyMessages { count, max });
        }
        Ok(())
    }

    fn verify_signatures(
        &self,
        subnet: &shared_types::SubnetId,
        object_hash: &Hash,
        signers: &[Address],
        signatures: &[Vec<u8>],
    ) -> GatewayResult<()> {
        let actor = self.actor_ref(subnet)?;
        let weights = actor.signer_weights(signers)?;
        let threshold = actor.weight_threshold(self.config.quorum.majority_percentage)?;
        debug!(subnet = %subnet, signers = signers.len(), threshold = %threshold, "Verifying multisignature");
        is_valid_weighted_multisignature(signers, &weights, threshold, object_hash, signatures)?;
        Ok(())
    }

    // =========================================================================
    // CHILD SIDE
    // =========================================================================

    /// Cut the local checkpoint at `block_height` and open its quorum.
    ///
    /// The checkpoint carries the bottom-up batch of the epoch ending at
    /// `block_height`.
    pub fn create_bottom_up_checkpoint(
        &mut self,
        block_height: ChainEpoch,
        block_hash: Hash,
        next_configuration_number: u64,
        membership_root: Hash,
        membership_weight: U256,
    ) -> GatewayResult<BottomUpCheckpoint> {
        let period = self.config.router.bottom_up_check_period;
        if block_height == 0 || block_height % period != 0 {
            return Err(GatewayError::NotCheckpointHeight {
                height: block_height,
                period,
            });
        }

        let checkpoint = BottomUpCheckpoint {
            subnet_id: self.network().clone(),
            block_height,
            block_hash,
            next_configuration_number,
            msgs: self.router.take_bottom_up_batch(block_height),
        };
        self.certifier.create_quorum_info(
            QuorumObjKind::Checkpoint,
            block_height,
            checkpoint.to_hash()?,
            membership_root,
            membership_weight,
        )?;
        self.checkpoints.insert(block_height, checkpoint.clone());

        info!(
            height = block_height,
            msgs = checkpoint.msgs.len(),
            next_configuration_number,
            "Bottom-up checkpoint created"
        );
        Ok(checkpoint)
    }

    /// Open the quorum of the batch cut at `height`.
    pub fn create_bottom_up_batch_quorum(
        &mut self,
        height: ChainEpoch,
        membership_root: Hash,
        membership_weight: U256,
    ) -> GatewayResult<BottomUpMsgBatch> {
        let batch = self
            .router
            .cut_batch(height)
            .cloned()
            .ok_or(GatewayError::ObjectNotFound {
                kind: "bottom-up batch",
                height,
            })?;
        self.certifier.create_quorum_info(
            QuorumObjKind::BottomUpMsgBatch,
            height,
            batch.to_hash()?,
            membership_root,
            membership_weight,
        )?;
        Ok(batch)
    }

    /// Count a member signature for the object at `height`.
    pub fn add_quorum_signature(
        &mut self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        membership_proof: &[Hash],
        weight: U256,
        signature: &[u8],
    ) -> GatewayResult<Address> {
        Ok(self.certifier.add_quorum_signature(
            kind,
            height,
            membership_proof,
            weight,
            signature,
        )?)
    }

    /// Drop quorums and their objects below `retention_height`.
    pub fn prune_quorums(
        &mut self,
        kind: QuorumObjKind,
        retention_height: ChainEpoch,
    ) -> GatewayResult<()> {
        self.certifier.prune_quorums(kind, retention_height)?;
        match kind {
            QuorumObjKind::Checkpoint => {
                self.checkpoints = self.checkpoints.split_off(&retention_height);
            }
            QuorumObjKind::BottomUpMsgBatch => self.router.prune_cut_batches(retention_height),
        }
        Ok(())
    }

    /// Quorum of the object at `height`.
    pub fn quorum_info(&self, kind: QuorumObjKind, height: ChainEpoch) -> Option<&QuorumInfo> {
        self.certifier.quorum_info(kind, height)
    }

    /// Signers and signatures collected at `height`, ready for submission.
    pub fn collected_signatures(
        &self,
        kind: QuorumObjKind,
        height: ChainEpoch,
    ) -> (Vec<Address>, Vec<Vec<u8>>) {
        self.certifier
            .map(kind)
            .signatures(height)
            .into_iter()
            .unzip()
    }
}
