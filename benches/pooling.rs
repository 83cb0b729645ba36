use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fueleu_core::{
    core::services::{BankingLedger, ComparisonService, PoolingService},
    domain::{fuel::FuelRecord, pool::PoolMemberInput, units::GramsCo2e},
    storage::MemoryStore,
};

const TARGET: f64 = 89.3368;

fn build_members(count: usize) -> Vec<PoolMemberInput> {
    (0..count)
        .map(|idx| {
            // Alternate surplus and slightly smaller deficits so the pool sum stays positive.
            let magnitude = 1_000.0 + (idx % 97) as f64 * 10_000.0;
            let cb = if idx % 2 == 0 { magnitude } else { -magnitude * 0.9 };
            PoolMemberInput::new(format!("S{idx}"), cb)
        })
        .collect()
}

fn build_records(count: usize) -> Vec<FuelRecord> {
    let fuels = ["HFO", "MGO", "LNG"];
    (0..count)
        .map(|idx| {
            let record = FuelRecord::new(
                format!("R{idx:05}"),
                fuels[idx % fuels.len()],
                100.0 + (idx % 50) as f64 * 25.0,
                2025,
            );
            if idx == 0 {
                record.as_baseline()
            } else {
                record
            }
        })
        .collect()
}

fn bench_pool_allocation(c: &mut Criterion) {
    for size in [10usize, 1_000, 10_000] {
        let members = build_members(black_box(size));
        c.bench_function(&format!("pool_allocate_{size}"), |b| {
            b.iter(|| {
                let result = PoolingService::create_pool(2025, &members).expect("pool");
                black_box(result);
            })
        });
    }
}

fn bench_comparison(c: &mut Criterion) {
    let records = build_records(black_box(10_000));
    let baseline = records[0].clone();
    c.bench_function("compare_to_baseline_10k", |b| {
        b.iter(|| {
            let results =
                ComparisonService::compare_to_baseline(&records, Some(&baseline), TARGET)
                    .expect("compare");
            black_box(results);
        })
    });
}

fn bench_banking(c: &mut Criterion) {
    c.bench_function("bank_then_apply", |b| {
        b.iter_batched(
            || {
                let store = Arc::new(MemoryStore::with_records(build_records(10)));
                BankingLedger::new(store.clone(), store, TARGET)
            },
            |ledger| {
                ledger
                    .bank("R00002", 2025, GramsCo2e(1_000_000.0))
                    .expect("bank");
                let outcome = ledger
                    .apply("R00002", 2025, GramsCo2e(500_000.0))
                    .expect("apply");
                black_box(outcome);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_pool_allocation, bench_comparison, bench_banking);
criterion_main!(benches);
