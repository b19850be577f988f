//! Flat-file CSV store: one file per symbol.
//!
//! Layout: `{data_dir}/{file_key}.csv` plus a `{file_key}.meta.json` sidecar.
//!
//! - Atomic writes (write to .tmp, rename into place)
//! - Header `Date,Open,High,Low,Close,Volume,Adj Close`
//! - Reads also accept CSVs written by pandas/yfinance: timestamped dates
//!   (`2005-10-17 00:00:00-04:00`), extra columns such as `Dividends`, and
//!   no `Adj Close` column

use super::ingest;
use super::provider::{DataError, DataSource, RawBar};
use crate::universe::file_key;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Column order of every CSV the store writes.
pub const STORE_COLUMNS: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Volume", "Adj Close"];

/// Metadata sidecar for a stored symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rows: usize,
    pub data_hash: String,
    pub source: DataSource,
    pub written_at: chrono::NaiveDateTime,
}

#[derive(Debug, Serialize)]
struct CsvRowOut {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
    #[serde(rename = "Adj Close")]
    adj_close: f64,
}

#[derive(Debug, Deserialize)]
struct CsvRowIn {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open", default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    // pandas may write volume as a float
    #[serde(rename = "Volume", default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
    #[serde(rename = "Adj Close", default, deserialize_with = "csv::invalid_option")]
    adj_close: Option<f64>,
}

/// Parse the date part of a `Date` cell.
///
/// Accepts `YYYY-MM-DD` optionally followed by a time and UTC offset; the
/// calendar date as written is kept, not converted to UTC.
pub fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let date_part = cell.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// CSV store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if it is missing.
    pub fn ensure_dirs(&self) -> Result<(), DataError> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)?;
            tracing::info!(dir = %self.data_dir.display(), "created data folder");
        }
        Ok(())
    }

    /// CSV path for a symbol: `{data_dir}/{file_key}.csv`.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", file_key(symbol)))
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.meta.json", file_key(symbol)))
    }

    /// Whether a CSV exists for the symbol.
    pub fn contains(&self, symbol: &str) -> bool {
        self.path_for(symbol).is_file()
    }

    /// Write bars for a symbol, replacing any existing file.
    ///
    /// Returns the path written.
    pub fn write(
        &self,
        symbol: &str,
        bars: &[RawBar],
        source: DataSource,
    ) -> Result<PathBuf, DataError> {
        let (first, last) = match (bars.first(), bars.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(DataError::Validation(format!("no bars to store for {symbol}"))),
        };

        self.ensure_dirs()?;
        let path = self.path_for(symbol);
        let tmp_path = path.with_extension("csv.tmp");

        let write_result = write_csv_file(&tmp_path, bars);

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            e
        })?;

        // The CSV is already in place; a missing sidecar only loses provenance
        if let Err(e) = self.write_meta(symbol, bars, first.date, last.date, source) {
            tracing::warn!(%symbol, error = %e, "failed to write metadata sidecar");
        }

        tracing::info!(%symbol, rows = bars.len(), path = %path.display(), "saved CSV");
        Ok(path)
    }

    /// Write the `.meta.json` sidecar atomically (tmp + rename).
    fn write_meta(
        &self,
        symbol: &str,
        bars: &[RawBar],
        start_date: NaiveDate,
        end_date: NaiveDate,
        source: DataSource,
    ) -> Result<(), DataError> {
        let meta = StoreMeta {
            symbol: symbol.to_string(),
            start_date,
            end_date,
            rows: bars.len(),
            data_hash: hash_bars(bars)?,
            source,
            written_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::Validation(format!("meta serialization: {e}")))?;

        let path = self.meta_path(symbol);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, meta_json)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            e
        })?;
        Ok(())
    }

    /// Read a symbol's bars back, cleaned (sorted, weekdays only).
    pub fn read(&self, symbol: &str) -> Result<Vec<RawBar>, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::NotStored {
                symbol: symbol.to_string(),
                path: path.display().to_string(),
            });
        }
        let bars = read_csv_file(&path)?;
        let result = ingest::ingest(bars).map_err(|e| DataError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(%symbol, rows = result.bars.len(), "loaded CSV");
        Ok(result.bars)
    }

    /// Header of the stored CSV as written, which may differ from
    /// [`STORE_COLUMNS`] for files produced by other tools.
    pub fn columns(&self, symbol: &str) -> Result<Vec<String>, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::NotStored {
                symbol: symbol.to_string(),
                path: path.display().to_string(),
            });
        }
        let parse_err = |e: csv::Error| DataError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(parse_err)?;
        let headers = rdr.headers().map_err(parse_err)?;
        Ok(headers.iter().map(str::to_string).collect())
    }

    /// Read the metadata sidecar, if present.
    pub fn read_meta(&self, symbol: &str) -> Result<Option<StoreMeta>, DataError> {
        let path = self.meta_path(symbol);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let meta = serde_json::from_str(&content).map_err(|e| DataError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(meta))
    }

    /// File keys of every CSV in the store, sorted.
    pub fn list(&self) -> Result<Vec<String>, DataError> {
        if !self.data_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut keys: Vec<String> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

fn write_csv_file(path: &Path, bars: &[RawBar]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for b in bars {
        wtr.serialize(CsvRowOut {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
            adj_close: b.adj_close,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse a price CSV without cleaning.
pub fn read_csv_file(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let parse_err = |reason: String| DataError::Parse {
        path: path.display().to_string(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| parse_err(e.to_string()))?;

    let mut bars = Vec::new();
    for (line, row) in rdr.deserialize::<CsvRowIn>().enumerate() {
        let row = row.map_err(|e| parse_err(e.to_string()))?;
        let date = parse_date_cell(&row.date)
            .ok_or_else(|| parse_err(format!("row {}: bad date '{}'", line + 1, row.date)))?;
        let close = row.close.unwrap_or(f64::NAN);
        bars.push(RawBar {
            date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close,
            volume: row.volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
            adj_close: row.adj_close.unwrap_or(close),
        });
    }
    Ok(bars)
}

/// BLAKE3 over the JSON encoding of the bars.
pub fn hash_bars(bars: &[RawBar]) -> Result<String, DataError> {
    let bytes = serde_json::to_vec(bars)
        .map_err(|e| DataError::Validation(format!("hash serialization: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
