//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over where bars come from (Yahoo Finance,
//! synthetic generation) so the download orchestration can be tested with a
//! mock provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily OHLCV bar as delivered by a provider or read back from CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no data found for symbol: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no CSV for '{symbol}' at {path}; run `pricelab download` first")]
    NotStored { symbol: String, path: String },

    #[error("CSV I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error in {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        DataError::Parse {
            path: "<csv>".into(),
            reason: e.to_string(),
        }
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Csv,
    Synthetic,
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// A source of daily bars.
///
/// Providers make exactly one attempt per call; the caller reports the
/// failure and moves on to the next symbol.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;
}

/// Progress callback for multi-symbol downloads.
pub trait DownloadProgress: Send {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, name: &str, index: usize, total: usize);

    /// Called when a symbol completes with the number of bars written or the error.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: Result<usize, &DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, name: &str, index: usize, total: usize) {
        println!("[{}/{}] Downloading {name} ({symbol})...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: Result<usize, &DataError>,
    ) {
        match result {
            Ok(rows) => println!("  OK: {symbol} ({rows} days)"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Silent reporter for tests and library callers.
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _name: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _: &str, _: usize, _: usize, _: Result<usize, &DataError>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
