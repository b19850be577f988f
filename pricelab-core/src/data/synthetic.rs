//! Deterministic synthetic bars for offline runs and tests.
//!
//! Each symbol gets its own random walk seeded from a BLAKE3 hash of the
//! symbol name, so repeated runs produce identical series.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate weekday bars for `symbol` over `[start, end]`, starting at 100.0.
pub fn generate_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;

    for current in start.iter_days().take_while(|d| *d <= end) {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(RawBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
            adj_close: close,
        });

        price = close;
    }

    bars
}

/// Provider that serves synthetic bars instead of hitting the network.
pub struct SyntheticProvider;

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = generate_bars(symbol, start, end);
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}
