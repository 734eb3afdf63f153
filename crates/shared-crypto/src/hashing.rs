//! # Keccak-256 Hashing
//!
//! The hash used for signing digests, address derivation and Merkle nodes.

use sha3::{Digest, Keccak256};

/// Keccak-256 output (256-bit).
pub type Digest32 = [u8; 32];

/// Stateful Keccak-256 hasher.
#[derive(Default)]
pub struct KeccakHasher {
    inner: Keccak256,
}

impl KeccakHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Digest32 {
        self.inner.finalize().into()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Digest32 {
    Keccak256::digest(data).into()
}

/// Hash the concatenation of several inputs.
pub fn keccak256_many(inputs: &[&[u8]]) -> Digest32 {
    let mut hasher = KeccakHasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}
