//! Percentage growth relative to the first observation.

use crate::data::PriceSeries;
use chrono::NaiveDate;

/// `(c - c0) / c0 * 100` for every close, where `c0` is the first close.
///
/// Empty input gives empty output. A zero or non-finite base makes every
/// value NaN.
pub fn percentage_growth(closes: &[f64]) -> Vec<f64> {
    let Some(&base) = closes.first() else {
        return Vec::new();
    };
    if base == 0.0 || !base.is_finite() {
        return vec![f64::NAN; closes.len()];
    }
    closes.iter().map(|c| (c - base) / base * 100.0).collect()
}

/// Dated growth curve for one series.
pub fn series_growth(series: &PriceSeries) -> Vec<(NaiveDate, f64)> {
    let growth = percentage_growth(&series.closes());
    series.dates().into_iter().zip(growth).collect()
}
