//! SVG chart rendering on plotters.
//!
//! Every chart is written as a standalone SVG file using a dark theme. Chart
//! functions take already-loaded series or computed statistics and never
//! touch the data store.

pub mod candlestick;
pub mod heatmap;
pub mod lines;
pub mod theme;
pub mod versus;

pub use candlestick::candlestick;
pub use heatmap::correlation_heatmap;
pub use lines::{percentage_growth, price_lines, rolling_correlations};
pub use versus::versus_benchmark;

use chrono::NaiveDate;
use plotters::drawing::DrawingAreaErrorKind;
use std::path::Path;
use thiserror::Error;

/// Result type of the inner drawing routines (SVG backend errors are io::Error).
pub(crate) type DrawResult<T> = Result<T, DrawingAreaErrorKind<std::io::Error>>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot for {0}")]
    Empty(String),

    #[error("drawing {path} failed: {reason}")]
    Drawing { path: String, reason: String },

    #[error("chart I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub(crate) fn drawing(path: &Path, err: impl std::fmt::Display) -> Self {
        ChartError::Drawing {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Create the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), ChartError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Date axis range; widened by a day when all points share one date.
pub(crate) fn date_range(
    dates: impl IntoIterator<Item = NaiveDate>,
) -> Option<std::ops::Range<NaiveDate>> {
    let mut iter = dates.into_iter();
    let first = iter.next()?;
    let (lo, hi) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    if lo == hi {
        Some(lo..hi + chrono::Duration::days(1))
    } else {
        Some(lo..hi)
    }
}

/// Value axis range over finite values with 5% padding on each side.
pub(crate) fn value_range(values: impl IntoIterator<Item = f64>) -> Option<std::ops::Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return None;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    Some((lo - pad)..(hi + pad))
}

/// " (N Years)" suffix for titles, from the longest series span.
pub(crate) fn years_suffix(span_years: i64) -> String {
    match span_years {
        0 => String::new(),
        1 => " (1 Year)".into(),
        n => format!(" ({n} Years)"),
    }
}
