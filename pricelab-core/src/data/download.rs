//! Download orchestrator: fetch each instrument once and store it as CSV.

use super::ingest;
use super::provider::{DataError, DataProvider, DownloadProgress};
use super::store::CsvStore;
use crate::universe::Instrument;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Download every instrument: fetch → clean → write CSV.
///
/// A failing symbol is recorded and the batch moves on to the next one.
pub fn download_symbols(
    provider: &dyn DataProvider,
    store: &CsvStore,
    instruments: &[&Instrument],
    start: NaiveDate,
    end: NaiveDate,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = instruments.len();
    let mut summary = DownloadSummary {
        total,
        written: Vec::new(),
        errors: Vec::new(),
    };

    for (i, instrument) in instruments.iter().enumerate() {
        progress.on_start(&instrument.symbol, &instrument.name, i, total);

        let result = download_single(provider, store, instrument, start, end);
        let rows = result.as_ref().map(|(_, rows)| *rows);
        progress.on_complete(&instrument.symbol, i, total, rows);

        match result {
            Ok((path, rows)) => summary.written.push(DownloadedSymbol {
                symbol: instrument.symbol.clone(),
                name: instrument.name.clone(),
                path,
                rows,
            }),
            Err(e) => {
                tracing::warn!(symbol = %instrument.symbol, error = %e, "download failed");
                summary.errors.push((instrument.symbol.clone(), e));
            }
        }
    }

    progress.on_batch_complete(summary.succeeded(), summary.failed(), total);
    summary
}

/// Download a single instrument. Returns the CSV path and row count.
fn download_single(
    provider: &dyn DataProvider,
    store: &CsvStore,
    instrument: &Instrument,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(PathBuf, usize), DataError> {
    let fetched = provider.fetch(&instrument.symbol, start, end)?;
    let cleaned = ingest::ingest(fetched.bars)?;
    if cleaned.report.weekend_dropped > 0 {
        tracing::debug!(
            symbol = %instrument.symbol,
            dropped = cleaned.report.weekend_dropped,
            "dropped weekend bars"
        );
    }
    let path = store.write(&instrument.symbol, &cleaned.bars, fetched.source)?;
    Ok((path, cleaned.bars.len()))
}

/// One symbol written to disk.
#[derive(Debug, Clone)]
pub struct DownloadedSymbol {
    pub symbol: String,
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Summary of a batch download operation.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub written: Vec<DownloadedSymbol>,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn succeeded(&self) -> usize {
        self.written.len()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.written.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataSource, FetchResult, NoProgress};
    use crate::data::synthetic::generate_bars;
    use std::sync::Mutex;

    /// Serves synthetic bars but fails for symbols in `fail`.
    struct MockProvider {
        fail: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl DataProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            self.calls.lock().unwrap().push(symbol.to_string());
            if self.fail.iter().any(|f| *f == symbol) {
                return Err(DataError::NetworkUnreachable("connection refused".into()));
            }
            Ok(FetchResult {
                symbol: symbol.to_string(),
                bars: generate_bars(symbol, start, end),
                source: DataSource::YahooFinance,
            })
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let provider = MockProvider {
            fail: vec!["SI=F"],
            calls: Mutex::new(Vec::new()),
        };
        let gold = Instrument::new("GC=F", "Gold");
        let silver = Instrument::new("SI=F", "Silver");
        let copper = Instrument::new("HG=F", "Copper");

        let summary = download_symbols(
            &provider,
            &store,
            &[&gold, &silver, &copper],
            d("2024-01-01"),
            d("2024-02-29"),
            &NoProgress,
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.errors[0].0, "SI=F");
        assert!(!summary.all_succeeded());
        assert!(!summary.all_failed());

        // Exactly one attempt per symbol
        assert_eq!(*provider.calls.lock().unwrap(), vec!["GC=F", "SI=F", "HG=F"]);

        assert!(dir.path().join("GC.csv").is_file());
        assert!(dir.path().join("HG.csv").is_file());
        assert!(!dir.path().join("SI.csv").exists());
    }

    #[test]
    fn written_rows_match_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let provider = MockProvider {
            fail: vec![],
            calls: Mutex::new(Vec::new()),
        };
        let fx = Instrument::new("EURUSD=X", "EURUSD");

        let summary = download_symbols(
            &provider,
            &store,
            &[&fx],
            d("2024-01-01"),
            d("2024-01-31"),
            &NoProgress,
        );

        assert!(summary.all_succeeded());
        let written = &summary.written[0];
        assert_eq!(written.path, dir.path().join("EURUSD=X.csv"));
        assert_eq!(store.read("EURUSD=X").unwrap().len(), written.rows);
    }

    #[test]
    fn every_symbol_failing_is_all_failed() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let provider = MockProvider {
            fail: vec!["CL=F"],
            calls: Mutex::new(Vec::new()),
        };
        let oil = Instrument::new("CL=F", "Crude Oil");
        let summary = download_symbols(
            &provider,
            &store,
            &[&oil],
            d("2024-01-01"),
            d("2024-01-31"),
            &NoProgress,
        );
        assert!(summary.all_failed());
    }
}
