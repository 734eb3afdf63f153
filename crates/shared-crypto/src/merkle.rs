//! # Membership Merkle Trees
//!
//! A validator set snapshot is committed as a Merkle root over
//! `(address, weight)` leaves. Signers prove membership with a sibling path.
//!
//! Leaves are double-hashed: `keccak(keccak(word(address) || be32(weight)))`.
//! Internal nodes hash the two children in sorted order, so proofs carry no
//! left/right flags. Trees are laid out as a flat array with the root at
//! index 0 and the children of `i` at `2i + 1` and `2i + 2`.

use crate::hashing::{keccak256, keccak256_many};
use crate::CryptoError;
use shared_types::{Address, Hash, U256};

/// Leaf hash committing `address` with `weight`.
pub fn membership_leaf(address: &Address, weight: U256) -> Hash {
    let mut encoded_weight = [0u8; 32];
    weight.to_big_endian(&mut encoded_weight);
    let inner = keccak256_many(&[&address.to_word(), &encoded_weight]);
    Hash(keccak256(&inner))
}

/// Hash of two nodes, independent of their order.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a.0 <= b.0 { (a, b) } else { (b, a) };
    Hash(keccak256_many(&[&lo.0, &hi.0]))
}

/// Fold `proof` into `leaf`, yielding the implied root.
pub fn process_proof(leaf: &Hash, proof: &[Hash]) -> Hash {
    proof.iter().fold(*leaf, |acc, sibling| hash_pair(&acc, sibling))
}

/// Whether `proof` links `leaf` to `root`.
pub fn verify_proof(root: &Hash, leaf: &Hash, proof: &[Hash]) -> bool {
    process_proof(leaf, proof) == *root
}

/// Tree over a weighted validator snapshot.
#[derive(Debug, Clone)]
pub struct MembershipTree {
    nodes: Vec<Hash>,
    leaves: Vec<(Address, U256)>,
}

impl MembershipTree {
    /// Build the tree. Leaf order follows `members`.
    pub fn new(members: &[(Address, U256)]) -> Result<Self, CryptoError> {
        if members.is_empty() {
            return Err(CryptoError::EmptyTree);
        }

        let len = 2 * members.len() - 1;
        let mut nodes = vec![Hash::ZERO; len];
        for (i, (address, weight)) in members.iter().enumerate() {
            nodes[len - 1 - i] = membership_leaf(address, *weight);
        }
        for i in (0..len - members.len()).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        Ok(Self {
            nodes,
            leaves: members.to_vec(),
        })
    }

    /// Root committing to the whole snapshot.
    pub fn root(&self) -> Hash {
        self.nodes[0]
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Always false; empty trees cannot be built.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Sum of all member weights, saturating.
    pub fn total_weight(&self) -> U256 {
        self.leaves
            .iter()
            .fold(U256::zero(), |acc, (_, w)| acc.saturating_add(*w))
    }

    /// Proof for the `index`-th member.
    pub fn proof(&self, index: usize) -> Result<Vec<Hash>, CryptoError> {
        if index >= self.leaves.len() {
            return Err(CryptoError::LeafOutOfRange {
                index,
                leaves: self.leaves.len(),
            });
        }

        let mut i = self.nodes.len() - 1 - index;
        let mut proof = Vec::new();
        while i > 0 {
            let sibling = if i % 2 == 1 { i + 1 } else { i - 1 };
            proof.push(self.nodes[sibling]);
            i = (i - 1) / 2;
        }
        Ok(proof)
    }

    /// Proof for `address`, with its committed weight.
    pub fn proof_for(&self, address: &Address) -> Option<(U256, Vec<Hash>)> {
        let index = self.leaves.iter().position(|(a, _)| a == address)?;
        let weight = self.leaves[index].1;
        self.proof(index).ok().map(|proof| (weight, proof))
    }
}
