//! Loading stored series for analysis and charting.
//!
//! Missing or unreadable CSVs are logged and skipped so one bad file never
//! blocks the rest of the charts. With `synthesize_missing`, a deterministic
//! synthetic series stands in for any symbol without a CSV.

use super::provider::{DataError, DataSource};
use super::series::PriceSeries;
use super::store::CsvStore;
use super::synthetic::generate_bars;
use crate::universe::Instrument;
use chrono::NaiveDate;

/// Options for [`load_universe`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Generate synthetic bars for symbols with no CSV.
    pub synthesize_missing: bool,
    /// Range for synthetic bars. Ignored unless `synthesize_missing` is set.
    pub synthetic_range: Option<(NaiveDate, NaiveDate)>,
}

/// Series that loaded, plus the symbols that did not.
#[derive(Debug, Default)]
pub struct LoadedData {
    /// Loaded series, in the order the instruments were given.
    pub series: Vec<PriceSeries>,
    pub failures: Vec<(String, DataError)>,
}

impl LoadedData {
    pub fn get(&self, name: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn has_synthetic(&self) -> bool {
        self.series.iter().any(|s| s.source == DataSource::Synthetic)
    }
}

/// Load every instrument's CSV from the store.
pub fn load_universe(
    store: &CsvStore,
    instruments: &[&Instrument],
    opts: &LoadOptions,
) -> LoadedData {
    let mut loaded = LoadedData::default();

    for instrument in instruments {
        match store.read(&instrument.symbol) {
            Ok(bars) => {
                tracing::info!(name = %instrument.name, days = bars.len(), "loaded");
                loaded.series.push(PriceSeries::new(
                    &instrument.name,
                    &instrument.symbol,
                    DataSource::Csv,
                    bars,
                ));
            }
            Err(DataError::NotStored { .. }) if opts.synthesize_missing => {
                let (start, end) = opts
                    .synthetic_range
                    .unwrap_or_else(default_synthetic_range);
                let bars = generate_bars(&instrument.symbol, start, end);
                tracing::warn!(name = %instrument.name, "no CSV, using synthetic data");
                loaded.series.push(PriceSeries::new(
                    &instrument.name,
                    &instrument.symbol,
                    DataSource::Synthetic,
                    bars,
                ));
            }
            Err(e) => {
                tracing::warn!(name = %instrument.name, error = %e, "error loading");
                loaded.failures.push((instrument.symbol.clone(), e));
            }
        }
    }

    loaded
}

/// Five years ending today.
fn default_synthetic_range() -> (NaiveDate, NaiveDate) {
    let end = chrono::Local::now().date_naive();
    (end - chrono::Duration::days(365 * 5), end)
}
