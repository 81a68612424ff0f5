//! Criterion benchmarks for cairn-wallet.
//!
//! Covers: fee/change planning over many inputs, chain cursor advance,
//! and snapshot export.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cairn_core::address::Network;
use cairn_core::types::{Hash256, OutPoint};
use cairn_wallet::{FeeRate, Seed, TransactionBuilder, UnspentOutput, UnspentOutputSet, Wallet};

fn unspent_set(n: u8) -> UnspentOutputSet {
    let mut set = UnspentOutputSet::new();
    for i in 0..n {
        set.insert(UnspentOutput {
            tx_id: Hash256([i; 32]),
            vout: 0,
            address: format!("owner-{i}"),
            value: 1_000_000,
            script: vec![0x76; 25],
        })
        .expect("unique outpoint");
    }
    set
}

fn bench_plan(c: &mut Criterion) {
    let set = unspent_set(100);
    let mut builder = TransactionBuilder::new(u64::MAX);
    for i in 0..100u8 {
        builder.add_input(OutPoint::new(Hash256([i; 32]), 0));
    }
    builder.add_recipient("dest-a", 30_000_000).add_recipient("dest-b", 20_000_000);

    c.bench_function("plan_100_inputs", |b| {
        b.iter(|| builder.plan(black_box(&set), FeeRate::default(), 546))
    });
}

fn bench_advance(c: &mut Criterion) {
    let seed = Seed::from_bytes(&[42u8; 32]).expect("seed");
    let mut wallet = Wallet::from_seed(&seed, Network::Mainnet).expect("wallet");

    c.bench_function("next_receive_address", |b| {
        b.iter(|| wallet.next_receive_address())
    });
}

fn bench_export(c: &mut Criterion) {
    let seed = Seed::from_bytes(&[7u8; 32]).expect("seed");
    let mut wallet = Wallet::from_seed(&seed, Network::Mainnet).expect("wallet");
    for _ in 0..200 {
        wallet.next_receive_address().expect("advance");
    }

    c.bench_function("export_200_addresses", |b| {
        b.iter(|| black_box(&wallet).export())
    });
}

criterion_group!(benches, bench_plan, bench_advance, bench_export);
criterion_main!(benches);
