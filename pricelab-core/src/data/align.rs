//! Multi-series time alignment.
//!
//! Two joins are supported:
//! - union: every date any series has; a series with no bar on a date gets
//!   NaN (no forward-fill)
//! - inner: only dates both series have

use super::series::PriceSeries;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Closing prices of several series on a common timeline.
#[derive(Debug, Clone)]
pub struct AlignedCloses {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Series names, in input order.
    pub names: Vec<String>,
    /// `columns[i]` holds the closes of `names[i]`, one per entry of `dates`.
    pub columns: Vec<Vec<f64>>,
}

impl AlignedCloses {
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Align closing prices on the union of all dates.
pub fn align_union(series: &[PriceSeries]) -> AlignedCloses {
    let all_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|b| b.date))
        .collect();
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let columns = series
        .iter()
        .map(|s| {
            let by_date: HashMap<NaiveDate, f64> =
                s.bars.iter().map(|b| (b.date, b.close)).collect();
            dates
                .iter()
                .map(|d| by_date.get(d).copied().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    AlignedCloses {
        dates,
        names: series.iter().map(|s| s.name.clone()).collect(),
        columns,
    }
}

/// Two close series restricted to the dates both contain.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Inner-join two series on date. Both inputs must be sorted ascending.
pub fn align_inner(left: &PriceSeries, right: &PriceSeries) -> AlignedPair {
    let mut pair = AlignedPair {
        dates: Vec::new(),
        left: Vec::new(),
        right: Vec::new(),
    };

    let (mut i, mut j) = (0, 0);
    while i < left.bars.len() && j < right.bars.len() {
        let (l, r) = (&left.bars[i], &right.bars[j]);
        match l.date.cmp(&r.date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                pair.dates.push(l.date);
                pair.left.push(l.close);
                pair.right.push(r.close);
                i += 1;
                j += 1;
            }
        }
    }

    pair
}
