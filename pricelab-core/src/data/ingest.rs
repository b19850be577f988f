//! Bar cleaning applied between fetch and storage, and again on load.
//!
//! - Sort ascending by date
//! - Collapse duplicate dates (last bar wins)
//! - Drop Saturday/Sunday bars (FX and futures feeds occasionally emit them)
//! - Reject bars whose close is not finite

use super::provider::{DataError, RawBar};
use chrono::{Datelike, Weekday};

/// Whether a bar falls on a weekday.
pub fn is_weekday(bar: &RawBar) -> bool {
    !matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Keep only Monday..Friday bars.
pub fn filter_weekdays(bars: Vec<RawBar>) -> Vec<RawBar> {
    bars.into_iter().filter(is_weekday).collect()
}

/// Summary of what cleaning removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub weekend_dropped: usize,
    pub duplicates_dropped: usize,
    pub missing_close_dropped: usize,
}

/// Cleaned bars plus a report of what was removed.
#[derive(Debug)]
pub struct IngestResult {
    pub bars: Vec<RawBar>,
    pub report: IngestReport,
}

/// Clean raw bars. Fails if nothing usable remains.
pub fn ingest(mut bars: Vec<RawBar>) -> Result<IngestResult, DataError> {
    let mut report = IngestReport::default();

    // Stable sort keeps provider order among equal dates, so "last wins" is well defined
    bars.sort_by_key(|b| b.date);

    let mut cleaned: Vec<RawBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if !is_weekday(&bar) {
            report.weekend_dropped += 1;
            continue;
        }
        if !bar.close.is_finite() {
            report.missing_close_dropped += 1;
            continue;
        }
        match cleaned.last_mut() {
            Some(prev) if prev.date == bar.date => {
                *prev = bar;
                report.duplicates_dropped += 1;
            }
            _ => cleaned.push(bar),
        }
    }

    if cleaned.is_empty() {
        return Err(DataError::Validation(
            "no usable bars after cleaning".into(),
        ));
    }

    Ok(IngestResult {
        bars: cleaned,
        report,
    })
}
