use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pqcrypto_traits::kem::{PublicKey as _, SecretKey as _};
use qyra_core::{kem_keypair, pack12, Qyra, ENC_SIZE, HEADER_SIZE, NONCE_SIZE};

fn session() -> Qyra {
    let (pk, sk) = kem_keypair();
    let mut qyra = Qyra::new();
    assert!(qyra.initialize(pk.as_bytes(), sk.as_bytes()));
    qyra.set_header(&[0x51u8; HEADER_SIZE]);
    qyra.set_nonce(&[0x3Cu8; NONCE_SIZE]);
    qyra
}

fn bench_mine(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow");
    group.sample_size(20);

    let mut miner = session();
    group.bench_function("mine-single-thread", |b| {
        b.iter(|| assert!(miner.mine()))
    });

    let mut parallel = session();
    parallel.enable_parallel_dfs();
    group.bench_function("mine-parallel", |b| b.iter(|| assert!(parallel.mine())));

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow");
    group.sample_size(20);

    let (pk, sk) = kem_keypair();
    let mut miner = Qyra::new();
    assert!(miner.initialize(pk.as_bytes(), sk.as_bytes()));
    miner.set_header(&[0x51u8; HEADER_SIZE]);
    miner.set_nonce(&[0x3Cu8; NONCE_SIZE]);
    assert!(miner.mine());
    let envelope = miner.solution.get();

    let mut verifier = Qyra::new();
    assert!(verifier.initialize(pk.as_bytes(), sk.as_bytes()));
    verifier.set_header(&[0x51u8; HEADER_SIZE]);
    verifier.set_nonce(&[0x3Cu8; NONCE_SIZE]);
    group.bench_function("validate", |b| {
        b.iter(|| assert!(verifier.validate(black_box(&envelope))))
    });

    group.finish();
}

fn bench_pack12(c: &mut Criterion) {
    let data = vec![0xA7u8; ENC_SIZE];
    c.bench_function("pack12-enc-block", |b| b.iter(|| pack12(black_box(&data))));
}

criterion_group!(benches, bench_mine, bench_validate, bench_pack12);
criterion_main!(benches);
