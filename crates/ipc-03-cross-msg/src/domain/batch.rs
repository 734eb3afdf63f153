//! Bottom-up message batches.
//!
//! Envelopes committed bottom-up accumulate in the batch of the next
//! checkpoint boundary. A batch that reaches the size bound is cut at the
//! current height and the epoch batch restarts with the incoming envelope.
//! Further cuts within the same block take the heights right after the last
//! cut, so cut heights stay distinct and ascending in nonce order.

use std::collections::BTreeMap;

use shared_types::{ArithmeticError, BottomUpMsgBatch, ChainEpoch, IpcEnvelope, SubnetId};

use crate::error::RouterResult;

/// First checkpoint boundary strictly above `height`.
pub fn next_epoch(height: ChainEpoch, period: ChainEpoch) -> Result<ChainEpoch, ArithmeticError> {
    let index = height
        .checked_div(period)
        .ok_or(ArithmeticError::Overflow)?;
    index
        .checked_add(1)
        .and_then(|i| i.checked_mul(period))
        .ok_or(ArithmeticError::Overflow)
}

/// Epoch batches and size-triggered batches.
#[derive(Debug, Clone)]
pub struct BatchStore {
    period: ChainEpoch,
    max_msgs: usize,
    epochs: BTreeMap<ChainEpoch, BottomUpMsgBatch>,
    cut: BTreeMap<ChainEpoch, BottomUpMsgBatch>,
}

impl BatchStore {
    /// Store cutting at `period` boundaries and at `max_msgs` envelopes.
    pub fn new(period: ChainEpoch, max_msgs: usize) -> Self {
        Self {
            period,
            max_msgs,
            epochs: BTreeMap::new(),
            cut: BTreeMap::new(),
        }
    }

    /// Checkpoint period.
    pub fn period(&self) -> ChainEpoch {
        self.period
    }

    /// Append `envelope` committed at `height`.
    ///
    /// Returns the batch cut early if the epoch batch was already full.
    pub fn append(
        &mut self,
        network: &SubnetId,
        envelope: IpcEnvelope,
        height: ChainEpoch,
    ) -> RouterResult<Option<BottomUpMsgBatch>> {
        let epoch = next_epoch(height, self.period)?;
        let full = self
            .epochs
            .get(&epoch)
            .is_some_and(|batch| batch.msgs.len() >= self.max_msgs);
        let cut_height = if full {
            self.free_cut_height(height)?
        } else {
            height
        };

        let batch = self
            .epochs
            .entry(epoch)
            .or_insert_with(|| BottomUpMsgBatch::new(network.clone(), epoch));

        if !full {
            batch.msgs.push(envelope);
            return Ok(None);
        }

        let cut = BottomUpMsgBatch {
            subnet_id: network.clone(),
            block_height: cut_height,
            msgs: std::mem::replace(&mut batch.msgs, vec![envelope]),
        };
        self.cut.insert(cut_height, cut.clone());
        Ok(Some(cut))
    }

    fn free_cut_height(&self, height: ChainEpoch) -> Result<ChainEpoch, ArithmeticError> {
        match self.cut.last_key_value() {
            Some((&last, _)) if last >= height => {
                last.checked_add(1).ok_or(ArithmeticError::Overflow)
            }
            _ => Ok(height),
        }
    }

    /// Live batch of the epoch ending at `epoch`.
    pub fn epoch_batch(&self, epoch: ChainEpoch) -> Option<&BottomUpMsgBatch> {
        self.epochs.get(&epoch)
    }

    /// Remove and return the epoch batch, e.g. when its checkpoint is cut.
    pub fn take_epoch_batch(&mut self, epoch: ChainEpoch) -> Option<BottomUpMsgBatch> {
        self.epochs.remove(&epoch)
    }

    /// Batch cut early at `height`.
    pub fn cut_batch(&self, height: ChainEpoch) -> Option<&BottomUpMsgBatch> {
        self.cut.get(&height)
    }

    /// Heights of early-cut batches, ascending.
    pub fn cut_heights(&self) -> Vec<ChainEpoch> {
        self.cut.keys().copied().collect()
    }

    /// Forget early-cut batches below `height`.
    pub fn prune_cut(&mut self, height: ChainEpoch) {
        self.cut = self.cut.split_off(&height);
    }
}
