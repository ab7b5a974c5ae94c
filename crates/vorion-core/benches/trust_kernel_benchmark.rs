// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Vorion Systems

//! Criterion benchmark suite for the trust kernel.
//!
//! Benchmarks cover the operations spec latency budgets bind directly:
//! score clamping, tier derivation, role-gate lookup, and context
//! integrity verification.
//!
//! Run with: `cargo bench --bench trust_kernel_benchmark`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vorion_core::storage::InMemoryStorage;
use vorion_core::trust::{check_role_tier, tier_of, TrustKernel};
use vorion_core::types::{AgentRole, ContextBindingType, TrustTier};

fn score_update_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("score_update");
    let mut kernel = TrustKernel::new(InMemoryStorage::new());

    for index in 0..100 {
        kernel.set_raw_score(&format!("agent-{index:04}"), 500);
    }

    group.bench_function("apply_delta_within_range", |bencher| {
        bencher.iter(|| {
            let outcome = kernel.apply_score_delta(black_box("agent-0042"), black_box(10));
            black_box(outcome);
        });
    });

    group.bench_function("apply_delta_triggers_clamp", |bencher| {
        bencher.iter(|| {
            let outcome = kernel.apply_score_delta(black_box("agent-0042"), black_box(10_000));
            black_box(outcome);
        });
    });

    group.finish();
}

fn tier_derivation_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("tier_derivation");

    group.bench_function("tier_of_all_bands", |bencher| {
        let scores = [0, 166, 167, 332, 333, 499, 500, 665, 666, 832, 833, 1000];
        bencher.iter(|| {
            for &score in &scores {
                black_box(tier_of(black_box(score)));
            }
        });
    });

    group.finish();
}

fn role_gate_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("role_gate");

    group.bench_function("check_role_tier_all_combinations", |bencher| {
        bencher.iter(|| {
            for role in AgentRole::ALL {
                for tier in [
                    TrustTier::T0,
                    TrustTier::T1,
                    TrustTier::T2,
                    TrustTier::T3,
                    TrustTier::T4,
                    TrustTier::T5,
                ] {
                    black_box(check_role_tier(black_box(role), black_box(tier)));
                }
            }
        });
    });

    group.finish();
}

fn context_binding_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("context_binding");
    let kernel = TrustKernel::new(InMemoryStorage::new());
    let binding = kernel.create_agent_context("tenant-bench", ContextBindingType::Enterprise, 0);

    group.bench_function("create_agent_context", |bencher| {
        bencher.iter(|| {
            let binding = kernel.create_agent_context(
                black_box("tenant-bench"),
                black_box(ContextBindingType::Enterprise),
                black_box(0),
            );
            black_box(binding);
        });
    });

    group.bench_function("verify_context_integrity", |bencher| {
        bencher.iter(|| {
            let result = kernel.verify_context_integrity(black_box(&binding));
            black_box(result);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    score_update_benchmark,
    tier_derivation_benchmark,
    role_gate_benchmark,
    context_binding_benchmark,
);

criterion_main!(benches);
