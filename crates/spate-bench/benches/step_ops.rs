//! Criterion micro-benchmarks for stage graph construction and stepping.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spate_bench::{prepare, reference_profile, stress_profile};
use spate_task::ExecOptions;

/// Benchmark: build the three-region stage graph for 64 blocks.
fn bench_build_stage_64(c: &mut Criterion) {
    let (driver, _mesh) = stress_profile();
    c.bench_function("build_stage_64", |b| {
        b.iter(|| {
            let collection = driver.build_stage(64, 1);
            black_box(collection.region_count());
        });
    });
}

/// Benchmark: one full two-stage step, 8 blocks of 64 cells.
fn bench_advance_reference(c: &mut Criterion) {
    let (mut driver, mut mesh) = reference_profile();
    prepare(&driver, &mut mesh);

    c.bench_function("advance_reference", |b| {
        b.iter(|| {
            let report = driver.advance(&mut mesh).unwrap();
            black_box(report.dt_next);
        });
    });
}

/// Benchmark: one full step on 64 blocks with a single worker, isolating
/// per-task dispatch overhead from parallel speedup.
fn bench_advance_stress_single_worker(c: &mut Criterion) {
    let (mut driver, mut mesh) = stress_profile();
    driver.set_exec_options(ExecOptions {
        workers: Some(1),
        ..ExecOptions::default()
    });
    prepare(&driver, &mut mesh);

    c.bench_function("advance_stress_single_worker", |b| {
        b.iter(|| {
            let report = driver.advance(&mut mesh).unwrap();
            black_box(report.dt_next);
        });
    });
}

criterion_group!(
    benches,
    bench_build_stage_64,
    bench_advance_reference,
    bench_advance_stress_single_worker
);
criterion_main!(benches);
