//! # Fixtures
//!
//! A root network `/r1` with one child subnet governed by actor `0x..64`.
//! Both sides run a [`Gateway`]; [`Hierarchy`] plays the relayer that moves
//! top-down messages into the child and certified checkpoints up to the root.

use std::sync::Arc;

use ipc_03_cross_msg::{ApplyOutcome, MessageHandler, SupplyKind};
use ipc_gateway::{Gateway, GatewayConfig, GatewayResult};
use parking_lot::Mutex;
use shared_crypto::{MembershipTree, Secp256k1KeyPair};
use shared_types::{
    Address, BottomUpCheckpoint, BottomUpMsgBatch, ChainEpoch, Hash, IpcEnvelope, QuorumObjKind,
    SubnetId, TokenAmount, U256,
};

/// Chain id of the root network.
pub const ROOT_CHAIN_ID: u64 = 1;

/// Address of the child's subnet actor on the root.
pub const SUBNET_ACTOR: u8 = 100;

/// Id-style address `i`.
pub fn addr(i: u8) -> Address {
    Address::from_id(i)
}

/// Token amount shorthand.
pub fn amt(n: u64) -> TokenAmount {
    TokenAmount::from(n)
}

/// Deterministic validator key `i` (non-zero secret).
pub fn validator_key(i: u8) -> Secp256k1KeyPair {
    let mut secret = [0u8; 32];
    secret[0] = 0x11;
    secret[31] = i;
    Secp256k1KeyPair::from_bytes(secret).expect("valid secret")
}

/// Root network id.
pub fn root_id() -> SubnetId {
    SubnetId::new_root(ROOT_CHAIN_ID)
}

/// Child subnet id.
pub fn child_id() -> SubnetId {
    SubnetId::child_of(&root_id(), addr(SUBNET_ACTOR))
}

/// Certified object ready for submission.
pub struct Certified<T> {
    /// Checkpoint or batch.
    pub object: T,
    /// Signers in submission order.
    pub signers: Vec<Address>,
    /// Signatures matching `signers`.
    pub signatures: Vec<Vec<u8>>,
}

/// Root plus one child, with the validator keys of the child.
pub struct Hierarchy {
    /// Root gateway.
    pub root: Arc<Gateway>,
    /// Child gateway.
    pub child: Arc<Gateway>,
    /// Child subnet id as registered on the root.
    pub subnet: SubnetId,
    keys: Vec<Secp256k1KeyPair>,
}

impl Hierarchy {
    /// Root and child with test configurations and a registered child.
    pub fn new() -> Self {
        Self::with_configs(
            GatewayConfig::for_testing(root_id()),
            GatewayConfig::for_testing(child_id()),
        )
    }

    /// Root and child with the given configurations.
    pub fn with_configs(root: GatewayConfig, child: GatewayConfig) -> Self {
        let root = Gateway::new(root).expect("root gateway");
        let child = Gateway::new(child).expect("child gateway");
        let subnet = root
            .register_subnet(addr(SUBNET_ACTOR), SupplyKind::Native, 0)
            .expect("register child");
        assert_eq!(subnet, child_id());
        Self {
            root: Arc::new(root),
            child: Arc::new(child),
            subnet,
            keys: Vec::new(),
        }
    }

    /// Child bootstrapped by validators with the given stakes.
    pub fn bootstrapped(stakes: &[u64]) -> Self {
        let mut hierarchy = Self::new();
        for stake in stakes {
            hierarchy.join(*stake).expect("deposit");
        }
        let bootstrapped = hierarchy
            .root
            .with_state(|state| {
                state
                    .actor(&hierarchy.subnet)
                    .is_some_and(|actor| actor.is_bootstrapped())
            })
            .expect("state");
        assert!(bootstrapped, "stakes {stakes:?} do not bootstrap the child");
        hierarchy
    }

    /// A new validator funds itself on the root and deposits `stake`.
    ///
    /// Returns its address and the configuration number of the change.
    pub fn join(&mut self, stake: u64) -> GatewayResult<(Address, Option<u64>)> {
        let index = u8::try_from(self.keys.len() + 1).expect("fewer than 255 validators");
        let key = validator_key(index);
        let validator = key.address();
        self.keys.push(key);

        self.root.mint(validator, amt(stake))?;
        let number = self.root.deposit(&self.subnet, validator, amt(stake))?;
        Ok((validator, number))
    }

    /// Address of validator `i` (1-based join order).
    pub fn validator(&self, i: usize) -> Address {
        self.keys[i - 1].address()
    }

    /// Every validator that joined.
    pub fn validators(&self) -> Vec<Address> {
        self.keys.iter().map(Secp256k1KeyPair::address).collect()
    }

    fn key(&self, address: &Address) -> &Secp256k1KeyPair {
        self.keys
            .iter()
            .find(|k| k.address() == *address)
            .expect("known validator")
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Active validators of the child and their power, as the root sees them.
    pub fn membership(&self) -> Vec<(Address, U256)> {
        self.root
            .with_state(|state| {
                state
                    .actor(&self.subnet)
                    .map(|actor| actor.staking().validators().active_validators())
                    .unwrap_or_default()
            })
            .expect("state")
    }

    /// Next configuration number of the child's validator set.
    pub fn next_configuration_number(&self) -> u64 {
        self.root
            .with_state(|state| {
                state
                    .actor(&self.subnet)
                    .map(|actor| actor.staking().next_configuration_number())
                    .unwrap_or(1)
            })
            .expect("state")
    }

    /// Native balance of `owner` on the root.
    pub fn root_balance(&self, owner: &Address) -> TokenAmount {
        self.root
            .with_state(|state| state.balance(&SupplyKind::Native, owner))
            .expect("state")
    }

    /// Native balance of `owner` on the child.
    pub fn child_balance(&self, owner: &Address) -> TokenAmount {
        self.child
            .with_state(|state| state.balance(&SupplyKind::Native, owner))
            .expect("state")
    }

    /// Circulating supply of the child as tracked by the root.
    pub fn circ_supply(&self) -> TokenAmount {
        self.root
            .with_state(|state| {
                state
                    .router()
                    .subnet(&self.subnet)
                    .map(|subnet| subnet.circ_supply)
                    .unwrap_or_default()
            })
            .expect("state")
    }

    // =========================================================================
    // RELAYER
    // =========================================================================

    /// Apply on the child every top-down message it has not seen yet.
    pub fn relay_top_down(&self, height: ChainEpoch) -> GatewayResult<Vec<ApplyOutcome>> {
        let from_nonce = self
            .child
            .with_state(|state| state.router().applied_top_down_nonce())?;
        let msgs = self
            .root
            .with_state(|state| state.router().top_down_msgs(&self.subnet, from_nonce))?;
        self.child.apply_top_down_messages(msgs, height)
    }

    /// Cut the child checkpoint at `height` and sign it with every active
    /// validator.
    pub fn certify_checkpoint(&self, height: ChainEpoch) -> Certified<BottomUpCheckpoint> {
        let signers: Vec<_> = self.membership().into_iter().map(|(a, _)| a).collect();
        self.certify_checkpoint_by(height, &signers)
    }

    /// Cut the child checkpoint at `height` and sign it with `signers`.
    pub fn certify_checkpoint_by(
        &self,
        height: ChainEpoch,
        signers: &[Address],
    ) -> Certified<BottomUpCheckpoint> {
        let tree = MembershipTree::new(&self.membership()).expect("membership tree");
        let checkpoint = self
            .child
            .create_bottom_up_checkpoint(
                height,
                block_hash(height),
                self.next_configuration_number(),
                tree.root(),
                tree.total_weight(),
            )
            .expect("checkpoint");
        let hash = checkpoint.to_hash().expect("hash");
        self.collect(QuorumObjKind::Checkpoint, height, &hash, &tree, signers);
        let (signers, signatures) = self
            .child
            .collected_signatures(QuorumObjKind::Checkpoint, height)
            .expect("signatures");
        Certified {
            object: checkpoint,
            signers,
            signatures,
        }
    }

    /// Open the quorum of the batch cut at `height` and sign it with every
    /// active validator.
    pub fn certify_batch(&self, height: ChainEpoch) -> Certified<BottomUpMsgBatch> {
        let members = self.membership();
        let tree = MembershipTree::new(&members).expect("membership tree");
        let batch = self
            .child
            .create_bottom_up_batch_quorum(height, tree.root(), tree.total_weight())
            .expect("batch quorum");
        let hash = batch.to_hash().expect("hash");
        let signers: Vec<_> = members.into_iter().map(|(a, _)| a).collect();
        self.collect(QuorumObjKind::BottomUpMsgBatch, height, &hash, &tree, &signers);
        let (signers, signatures) = self
            .child
            .collected_signatures(QuorumObjKind::BottomUpMsgBatch, height)
            .expect("signatures");
        Certified {
            object: batch,
            signers,
            signatures,
        }
    }

    fn collect(
        &self,
        kind: QuorumObjKind,
        height: ChainEpoch,
        hash: &Hash,
        tree: &MembershipTree,
        signers: &[Address],
    ) {
        for signer in signers {
            let (weight, proof) = tree.proof_for(signer).expect("member");
            let signature = self
                .key(signer)
                .sign_digest(hash.as_bytes())
                .expect("sign");
            self.child
                .add_quorum_signature(kind, height, &proof, weight, &signature)
                .expect("quorum signature");
        }
    }

    /// Certify the child checkpoint at `height` and submit it to the root.
    pub fn settle_checkpoint(&self, height: ChainEpoch) -> GatewayResult<Vec<ApplyOutcome>> {
        let certified = self.certify_checkpoint(height);
        self.root.submit_checkpoint(
            certified.object,
            &certified.signers,
            &certified.signatures,
            height + 1,
        )
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

/// Block hash stand-in for `height`.
pub fn block_hash(height: ChainEpoch) -> Hash {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&height.to_be_bytes());
    Hash(bytes)
}

/// Handler recording what it receives and answering with a fixed reply.
#[derive(Default)]
pub struct RecordingHandler {
    /// Envelopes delivered so far.
    pub received: Mutex<Vec<IpcEnvelope>>,
    /// Revert instead of answering.
    pub revert: bool,
}

impl RecordingHandler {
    /// Handler that accepts everything.
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Handler that reverts everything.
    pub fn reverting() -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(Vec::new()),
            revert: true,
        })
    }

    /// Envelopes delivered so far.
    pub fn received(&self) -> Vec<IpcEnvelope> {
        self.received.lock().clone()
    }
}

impl MessageHandler for RecordingHandler {
    fn handle_ipc_message(
        &self,
        envelope: &IpcEnvelope,
    ) -> Result<Vec<u8>, ipc_03_cross_msg::HandlerError> {
        self.received.lock().push(envelope.clone());
        if self.revert {
            return Err(ipc_03_cross_msg::HandlerError::Reverted(b"nope".to_vec()));
        }
        Ok(b"pong".to_vec())
    }
}
