use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sha256d_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("sha256d_256B", |b| {
        b.iter(|| payd_crypto::sha256d(black_box(&data)))
    });
}

fn sha256d_1kb_bench(c: &mut Criterion) {
    let data = vec![0xCDu8; 1024];

    c.bench_function("sha256d_1KB", |b| {
        b.iter(|| payd_crypto::sha256d(black_box(&data)))
    });
}

fn hash_transaction_bench(c: &mut Criterion) {
    let tx_bytes = vec![0xFFu8; 512];

    c.bench_function("hash_transaction_512B", |b| {
        b.iter(|| payd_crypto::hash_transaction(black_box(&tx_bytes)))
    });
}

fn branch_root_bench(c: &mut Criterion) {
    let leaves: Vec<[u8; 32]> = (0..4096u32)
        .map(|i| payd_crypto::sha256d(&i.to_le_bytes()))
        .collect();
    let index = 2777;
    let branch = payd_crypto::merkle_branch(&leaves, index).unwrap();
    let leaf = leaves[index];

    c.bench_function("branch_root_depth12", |b| {
        b.iter(|| payd_crypto::branch_root(black_box(leaf), index as u64, black_box(&branch)))
    });
}

fn merkle_root_bench(c: &mut Criterion) {
    let leaves: Vec<[u8; 32]> = (0..1000u32)
        .map(|i| payd_crypto::sha256d(&i.to_le_bytes()))
        .collect();

    c.bench_function("merkle_root_1000_leaves", |b| {
        b.iter(|| payd_crypto::merkle_root(black_box(&leaves)))
    });
}

criterion_group!(
    benches,
    sha256d_bench,
    sha256d_1kb_bench,
    hash_transaction_bench,
    branch_root_bench,
    merkle_root_bench,
);
criterion_main!(benches);
