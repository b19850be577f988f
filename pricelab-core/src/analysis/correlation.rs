//! Pearson correlation: full-sample matrix and rolling window.

use super::AnalysisError;
use crate::data::align::{align_inner, align_union, AlignedPair};
use crate::data::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Pearson correlation over the pairs where both values are finite.
///
/// Returns NaN for fewer than two usable pairs or when either side has zero
/// variance. Inputs of different length are truncated to the shorter one.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return f64::NAN;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Symmetric correlation matrix of closing prices.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `values[i][j]` = corr(names[i], names[j]).
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }
}

/// Correlation matrix of closes, aligned on the union of dates.
///
/// Each entry uses the dates on which both series have a close
/// (pairwise-complete observations). The diagonal is 1.0 for any series with
/// variance and NaN otherwise.
pub fn correlation_matrix(series: &[PriceSeries]) -> CorrelationMatrix {
    let aligned = align_union(series);
    let n = aligned.names.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        let self_corr = pearson(&aligned.columns[i], &aligned.columns[i]);
        values[i][i] = if self_corr.is_nan() { f64::NAN } else { 1.0 };
        for j in (i + 1)..n {
            let r = pearson(&aligned.columns[i], &aligned.columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        names: aligned.names,
        values,
    }
}

/// Rolling correlation over an inner-aligned pair.
///
/// One output per aligned date. The first `window - 1` entries are `None`,
/// as is any window containing a non-finite value or zero variance.
pub fn rolling_correlation(
    pair: &AlignedPair,
    window: usize,
) -> Result<Vec<Option<f64>>, AnalysisError> {
    if window < 2 {
        return Err(AnalysisError::InvalidWindow(window));
    }

    let n = pair.len();
    let mut out = Vec::with_capacity(n);
    for end in 0..n {
        if end + 1 < window {
            out.push(None);
            continue;
        }
        let start = end + 1 - window;
        let xs = &pair.left[start..=end];
        let ys = &pair.right[start..=end];
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            out.push(None);
            continue;
        }
        let r = pearson(xs, ys);
        out.push(if r.is_nan() { None } else { Some(r) });
    }
    Ok(out)
}

/// Rolling correlation of one series against a benchmark.
#[derive(Debug, Clone)]
pub struct RollingCorrelation {
    /// Name of the compared series.
    pub name: String,
    pub benchmark: String,
    pub window: usize,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl RollingCorrelation {
    /// Legend label, e.g. "Gold vs NASDAQ".
    pub fn label(&self) -> String {
        format!("{} vs {}", self.name, self.benchmark)
    }

    /// Points with a defined correlation.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().filter_map(|(d, r)| r.map(|r| (*d, r)))
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|(_, r)| *r)
    }
}

/// Rolling correlation of every non-benchmark series against the benchmark.
pub fn rolling_vs_benchmark(
    series: &[PriceSeries],
    benchmark: &PriceSeries,
    window: usize,
) -> Result<Vec<RollingCorrelation>, AnalysisError> {
    series
        .iter()
        .filter(|s| s.name != benchmark.name)
        .map(|s| {
            let pair = align_inner(benchmark, s);
            let values = rolling_correlation(&pair, window)?;
            Ok(RollingCorrelation {
                name: s.name.clone(),
                benchmark: benchmark.name.clone(),
                window,
                points: pair.dates.into_iter().zip(values).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataSource, RawBar};

    fn series(name: &str, start: NaiveDate, closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| RawBar {
                date: start + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 0,
                adj_close: c,
            })
            .collect();
        PriceSeries::new(name, name, DataSource::Csv, bars)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn perfect_positive_and_negative() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn known_value() {
        // r = 0.8 for this textbook pair
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert!((pearson(&xs, &ys) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn constant_or_short_is_nan() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn nan_pairs_are_skipped() {
        let xs = [1.0, f64::NAN, 2.0, 3.0];
        let ys = [2.0, 100.0, 4.0, 6.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let start = d("2024-01-01");
        let a = series("A", start, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = series("B", start, &[5.0, 3.0, 4.0, 1.0, 2.0]);
        let c = series("C", start, &[2.0, 1.0, 4.0, 3.0, 5.0]);

        let m = correlation_matrix(&[a, b, c]);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert!((m.get_by_name("A", "C").unwrap() - 0.8).abs() < 1e-12);
        assert!(m.get_by_name("A", "Z").is_none());
    }

    #[test]
    fn matrix_uses_pairwise_overlap() {
        // B starts two days later; only the overlapping dates count
        let a = series("A", d("2024-01-01"), &[9.0, -9.0, 1.0, 2.0, 3.0]);
        let b = series("B", d("2024-01-03"), &[10.0, 20.0, 30.0]);
        let m = correlation_matrix(&[a, b]);
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_diagonal_nan_for_flat_series() {
        let flat = series("Flat", d("2024-01-01"), &[1.0, 1.0, 1.0]);
        let m = correlation_matrix(&[flat]);
        assert!(m.get(0, 0).is_nan());
    }

    #[test]
    fn rolling_leading_values_are_none() {
        let pair = AlignedPair {
            dates: (0..5).map(|i| d("2024-01-01") + chrono::Duration::days(i)).collect(),
            left: vec![1.0, 2.0, 3.0, 4.0, 5.0],
            right: vec![2.0, 4.0, 6.0, 8.0, 11.0],
        };
        let r = rolling_correlation(&pair, 3).unwrap();
        assert_eq!(r.len(), 5);
        assert!(r[0].is_none() && r[1].is_none());
        assert!((r[2].unwrap() - 1.0).abs() < 1e-12);
        assert!(r[4].unwrap() < 1.0);
    }

    #[test]
    fn rolling_window_with_nan_is_none() {
        let pair = AlignedPair {
            dates: (0..4).map(|i| d("2024-01-01") + chrono::Duration::days(i)).collect(),
            left: vec![1.0, f64::NAN, 3.0, 4.0],
            right: vec![1.0, 2.0, 3.0, 5.0],
        };
        let r = rolling_correlation(&pair, 2).unwrap();
        assert_eq!(r[1], None);
        assert_eq!(r[2], None);
        assert!(r[3].is_some());
    }

    #[test]
    fn rolling_flat_window_is_none() {
        let pair = AlignedPair {
            dates: (0..3).map(|i| d("2024-01-01") + chrono::Duration::days(i)).collect(),
            left: vec![1.0, 1.0, 1.0],
            right: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(rolling_correlation(&pair, 3).unwrap()[2], None);
    }

    #[test]
    fn rolling_rejects_tiny_window() {
        let pair = AlignedPair {
            dates: vec![],
            left: vec![],
            right: vec![],
        };
        assert_eq!(
            rolling_correlation(&pair, 1),
            Err(AnalysisError::InvalidWindow(1))
        );
    }

    #[test]
    fn rolling_window_longer_than_data_is_all_none() {
        let pair = AlignedPair {
            dates: (0..3).map(|i| d("2024-01-01") + chrono::Duration::days(i)).collect(),
            left: vec![1.0, 2.0, 3.0],
            right: vec![3.0, 2.0, 1.0],
        };
        let r = rolling_correlation(&pair, 252).unwrap();
        assert!(r.iter().all(Option::is_none));
    }

    #[test]
    fn vs_benchmark_skips_benchmark_and_inner_aligns() {
        let nasdaq = series("NASDAQ", d("2024-01-01"), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let gold = series("Gold", d("2024-01-03"), &[3.0, 1.0, 4.0, 2.0]);
        let oil = series("Crude Oil", d("2024-01-01"), &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);

        let curves =
            rolling_vs_benchmark(&[oil, nasdaq.clone(), gold], &nasdaq, 3).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label(), "Crude Oil vs NASDAQ");
        assert!((curves[0].latest().unwrap() + 1.0).abs() < 1e-12);

        // Gold overlaps NASDAQ on four dates
        assert_eq!(curves[1].points.len(), 4);
        assert_eq!(curves[1].points[0].0, d("2024-01-03"));
        assert_eq!(curves[1].defined().count(), 2);
    }
}
