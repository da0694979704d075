//! Criterion benchmarks for verdict-analysis.
//!
//! - full engine run, 5 variables × 500 rows, voting
//! - isolation forest, 1000 × 4
//! - local outlier factor, 500 × 4
//! - Rosner, n = 1000

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use verdict_analysis::outliers::hypothesis::rosner;
use verdict_analysis::outliers::multivariate::{isolation_forest, lof};
use verdict_analysis::OutlierEngine;
use verdict_core::{Column, Dataset, DetectionConfig, NumericMatrix, NumericSample, RowId};

/// Deterministic pseudo-noise in [-1, 1).
fn noise(i: usize, salt: usize) -> f64 {
    let h = (i as u64 ^ (salt as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    (h >> 11) as f64 / (1u64 << 52) as f64 - 1.0
}

fn column(n: usize, salt: usize) -> Vec<f64> {
    (0..n)
        .map(|i| if i % 97 == 0 { 50.0 } else { 10.0 * noise(i, salt) })
        .collect()
}

fn matrix(n: usize, p: usize) -> NumericMatrix {
    let rows = (0..n).map(|i| (0..p).map(|j| noise(i, j)).collect()).collect();
    let columns = (0..p).map(|j| format!("v{j}")).collect();
    NumericMatrix::new(columns, (0..n).map(RowId).collect(), rows).unwrap()
}

fn bench_engine(c: &mut Criterion) {
    let mut ds = Dataset::new("bench");
    for j in 0..5 {
        ds.push_column(format!("v{j}"), Column::numeric(column(500, j))).unwrap();
    }
    let engine = OutlierEngine::new(DetectionConfig::default()).unwrap();

    c.bench_function("engine_run_5x500", |b| {
        b.iter(|| black_box(engine.run(black_box(&ds)).unwrap()))
    });
}

fn bench_multivariate(c: &mut Criterion) {
    let big = matrix(1000, 4);
    c.bench_function("isolation_forest_1000x4", |b| {
        b.iter(|| black_box(isolation_forest::detect(black_box(&big), 0.05, 42).unwrap()))
    });

    let mid = matrix(500, 4);
    c.bench_function("lof_500x4", |b| {
        b.iter(|| black_box(lof::detect(black_box(&mid), 0.05, None).unwrap()))
    });
}

fn bench_rosner(c: &mut Criterion) {
    let sample = NumericSample::from_values(&column(1000, 9));
    c.bench_function("rosner_1000", |b| {
        b.iter(|| black_box(rosner::detect(black_box(&sample), 0.05, None)))
    });
}

criterion_group!(benches, bench_engine, bench_multivariate, bench_rosner);
criterion_main!(benches);
