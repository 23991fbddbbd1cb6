use criterion::{black_box, criterion_group, criterion_main, Criterion};
use split_ledger::engine::{compute_nets, compute_pairwise_debts, suggest_settlements};
use split_ledger::simulation::generator::{generate_random_ledger, LedgerConfig};

fn bench_small_group(c: &mut Criterion) {
    let config = LedgerConfig {
        member_count: 6,
        expense_count: 100,
        ..Default::default()
    };
    let Ok(snapshot) = generate_random_ledger(&config) else {
        return;
    };

    c.bench_function("nets_6_members_100_expenses", |b| {
        b.iter(|| compute_nets(black_box(&snapshot), 2))
    });
    c.bench_function("settle_6_members_100_expenses", |b| {
        b.iter(|| suggest_settlements(black_box(&snapshot), 2))
    });
}

fn bench_large_group(c: &mut Criterion) {
    let config = LedgerConfig {
        member_count: 50,
        expense_count: 5_000,
        settlement_count: 200,
        ..Default::default()
    };
    let Ok(snapshot) = generate_random_ledger(&config) else {
        return;
    };

    c.bench_function("settle_50_members_5000_expenses", |b| {
        b.iter(|| suggest_settlements(black_box(&snapshot), 2))
    });
    c.bench_function("pairwise_50_members_5000_expenses", |b| {
        b.iter(|| compute_pairwise_debts(black_box(&snapshot), 2))
    });
}

criterion_group!(benches, bench_small_group, bench_large_group);
criterion_main!(benches);
