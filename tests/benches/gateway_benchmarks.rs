//! # IPC Gateway Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Membership | Merkle tree build and proof |
//! | Multisig | Weighted signature verification |
//! | Router | Top-down commit through the gateway |
//! | Quorum | Signature collection until quorum |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipc_02_quorum::is_valid_weighted_multisignature;
use ipc_03_cross_msg::SupplyKind;
use ipc_gateway::{Gateway, GatewayConfig};
use rand::Rng;
use shared_crypto::{MembershipTree, Secp256k1KeyPair};
use shared_types::{Address, Hash, QuorumObjKind, SubnetId, TokenAmount, U256};
use std::time::Duration;

fn keys(n: usize) -> Vec<Secp256k1KeyPair> {
    (0..n).map(|_| Secp256k1KeyPair::generate()).collect()
}

fn members(keys: &[Secp256k1KeyPair]) -> Vec<(Address, U256)> {
    let mut rng = rand::thread_rng();
    keys.iter()
        .map(|k| (k.address(), U256::from(rng.gen_range(1..1_000u64))))
        .collect()
}

fn random_hash() -> Hash {
    Hash(rand::thread_rng().gen())
}

// ============================================================================
// MEMBERSHIP TREE
// ============================================================================

fn bench_membership_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership-tree");

    for size in [4usize, 16, 64, 256] {
        let members = members(&keys(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), &members, |b, m| {
            b.iter(|| black_box(MembershipTree::new(m).map(|t| t.root())))
        });

        let tree = MembershipTree::new(&members).expect("tree");
        let last = members[size - 1].0;
        group.bench_with_input(BenchmarkId::new("proof", size), &tree, |b, t| {
            b.iter(|| black_box(t.proof_for(&last)))
        });
    }

    group.finish();
}

// ============================================================================
// WEIGHTED MULTISIG
// ============================================================================

fn bench_weighted_multisig(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighted-multisig");
    group.measurement_time(Duration::from_secs(10));

    for size in [4usize, 16, 64] {
        let keys = keys(size);
        let hash = random_hash();
        let signers: Vec<_> = keys.iter().map(Secp256k1KeyPair::address).collect();
        let weights = vec![U256::one(); size];
        let signatures: Vec<_> = keys
            .iter()
            .map(|k| k.sign_digest(hash.as_bytes()).expect("sign"))
            .collect();
        let threshold = U256::from(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("verify", size), |b| {
            b.iter(|| {
                black_box(
                    is_valid_weighted_multisignature(
                        &signers,
                        &weights,
                        threshold,
                        &hash,
                        &signatures,
                    )
                    .is_ok(),
                )
            })
        });
    }

    group.finish();
}

// ============================================================================
// ROUTER
// ============================================================================

fn bench_top_down_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("router");

    let gateway = Gateway::new(GatewayConfig::for_testing(SubnetId::new_root(1))).expect("gateway");
    let subnet = gateway
        .register_subnet(Address::from_id(100), SupplyKind::Native, 0)
        .expect("subnet");
    let funder = Address::from_id(1);
    gateway
        .mint(funder, TokenAmount::from(u64::MAX))
        .expect("mint");

    group.throughput(Throughput::Elements(1));
    group.bench_function("fund", |b| {
        b.iter(|| {
            black_box(gateway.fund(&subnet, funder, Address::from_id(2), TokenAmount::one(), 1))
        })
    });

    group.finish();
}

// ============================================================================
// QUORUM
// ============================================================================

fn bench_quorum_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("quorum");

    for size in [4usize, 16] {
        let keys = keys(size);
        let members = members(&keys);
        let tree = MembershipTree::new(&members).expect("tree");
        let hash = random_hash();
        let signed: Vec<_> = keys
            .iter()
            .map(|k| {
                let (weight, proof) = tree.proof_for(&k.address()).expect("member");
                let signature = k.sign_digest(hash.as_bytes()).expect("sign");
                (weight, proof, signature)
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("collect", size), |b| {
            b.iter(|| {
                let child = SubnetId::child_of(&SubnetId::new_root(1), Address::from_id(100));
                let gateway = Gateway::new(GatewayConfig::for_testing(child)).expect("gateway");
                gateway
                    .create_bottom_up_checkpoint(10, hash, 1, tree.root(), tree.total_weight())
                    .expect("checkpoint");
                for (weight, proof, signature) in &signed {
                    black_box(
                        gateway
                            .add_quorum_signature(
                                QuorumObjKind::Checkpoint,
                                10,
                                proof,
                                *weight,
                                signature,
                            )
                            .is_ok(),
                    );
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_membership_tree,
    bench_weighted_multisig,
    bench_top_down_commit,
    bench_quorum_collection,
);
criterion_main!(benches);
