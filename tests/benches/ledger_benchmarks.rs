//! # FAT Ledger Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | fat-01 Entry Authentication | verify 1, 4 and 16 signing pairs |
//! | fat-05 Chain Processor | apply one signed FAT-0 transfer |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fat_01_entry_authentication::{validate_ext_ids, EntryAuthenticator};
use fat_tests::fixtures::*;
use shared_types::Address;
use std::time::Duration;

fn bench_signature_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("fat-01-entry-authentication");
    group.measurement_time(Duration::from_secs(5));

    for pairs in [1usize, 4, 16] {
        let signers: Vec<_> = (1..=pairs as u8).map(user).collect();
        let inputs = signers
            .iter()
            .map(|s| format!(r#""{}":1"#, s.address()))
            .collect::<Vec<_>>()
            .join(",");
        let content = format!(
            r#"{{"inputs":{{{inputs}}},"outputs":{{"{}":{pairs}}}}}"#,
            user(200).address()
        );
        let entry = signed(&content, &signers).expect("sign");

        group.throughput(Throughput::Elements(pairs as u64));
        group.bench_with_input(BenchmarkId::new("validate_ext_ids", pairs), &entry, |b, e| {
            b.iter(|| validate_ext_ids(black_box(e)))
        });
    }

    let entry = signed(&fat0_issuance(-1), &[issuer()]).expect("sign");
    let authenticator = EntryAuthenticator::new();
    group.bench_function("authenticate", |b| {
        b.iter(|| authenticator.authenticate(black_box(&entry)).is_ok())
    });

    group.finish();
}

fn bench_process_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("fat-05-chain-processor");
    let alice = user(1);
    let bob = user(2);

    let mut processor = memory_processor().expect("processor");
    processor
        .process_entry(&signed(&fat0_issuance(-1), &[issuer()]).expect("sign"), 1)
        .expect("issuance");
    processor
        .process_entry(
            &signed(
                &fat0_transfer(Address::coinbase(), alice.address(), u64::MAX / 2),
                &[issuer()],
            )
            .expect("sign"),
            2,
        )
        .expect("coinbase");
    let transfer = signed(&fat0_transfer(alice.address(), bob.address(), 1), &[alice])
        .expect("sign");

    let mut entry_id = 3;
    group.bench_function("fat0_transfer", |b| {
        b.iter(|| {
            entry_id += 1;
            processor
                .process_entry(black_box(&transfer), entry_id)
                .is_ok()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_signature_pairs, bench_process_transfer);
criterion_main!(benches);
