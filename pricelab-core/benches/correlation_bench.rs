//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Rolling correlation over 20 years of daily closes, two window sizes
//! 2. Correlation matrix of the four-series analysis set (union alignment)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use pricelab_core::analysis::{correlation_matrix, rolling_correlation};
use pricelab_core::data::synthetic::generate_bars;
use pricelab_core::data::{align_inner, DataSource, PriceSeries};

// ── Helpers ──────────────────────────────────────────────────────────

fn twenty_years(symbol: &str, name: &str) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2004, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    PriceSeries::new(name, symbol, DataSource::Synthetic, generate_bars(symbol, start, end))
}

fn analysis_set() -> Vec<PriceSeries> {
    vec![
        twenty_years("CL=F", "Crude Oil"),
        twenty_years("^IXIC", "NASDAQ"),
        twenty_years("GC=F", "Gold"),
        twenty_years("EURUSD=X", "EURUSD"),
    ]
}

// ── 1. Rolling correlation ───────────────────────────────────────────

fn bench_rolling(c: &mut Criterion) {
    let nasdaq = twenty_years("^IXIC", "NASDAQ");
    let gold = twenty_years("GC=F", "Gold");
    let pair = align_inner(&nasdaq, &gold);

    let mut group = c.benchmark_group("rolling_correlation");
    for window in [63usize, 252] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &w| {
            b.iter(|| rolling_correlation(black_box(&pair), w))
        });
    }
    group.finish();
}

// ── 2. Correlation matrix ────────────────────────────────────────────

fn bench_matrix(c: &mut Criterion) {
    let series = analysis_set();
    c.bench_function("correlation_matrix_4x20y", |b| {
        b.iter(|| correlation_matrix(black_box(&series)))
    });
}

criterion_group!(benches, bench_rolling, bench_matrix);
criterion_main!(benches);
