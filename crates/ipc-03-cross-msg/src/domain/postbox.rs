//! Envelopes awaiting forwarding, keyed by content hash.

use std::collections::HashMap;

use shared_types::{Hash, IpcEnvelope};

use crate::error::RouterResult;

/// Holding area for envelopes not addressed to the local network.
#[derive(Debug, Clone, Default)]
pub struct Postbox {
    entries: HashMap<Hash, IpcEnvelope>,
}

impl Postbox {
    /// Empty postbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `envelope` and return its id.
    pub fn store(&mut self, envelope: IpcEnvelope) -> RouterResult<Hash> {
        let id = envelope.to_hash()?;
        self.entries.insert(id, envelope);
        Ok(id)
    }

    /// Remove the entry under `id`.
    pub fn take(&mut self, id: &Hash) -> Option<IpcEnvelope> {
        self.entries.remove(id)
    }

    /// Entry under `id`.
    pub fn get(&self, id: &Hash) -> Option<&IpcEnvelope> {
        self.entries.get(id)
    }

    /// Ids currently parked.
    pub fn ids(&self) -> Vec<Hash> {
        let mut ids: Vec<Hash> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of parked envelopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
