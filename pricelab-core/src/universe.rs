//! Instrument universe: the symbols we download and chart.
//!
//! The default set covers crude oil, gold, silver, copper, the NASDAQ
//! composite and EUR/USD. Silver and copper are downloaded but left out of
//! the comparative charts. A custom universe can be loaded from TOML:
//!
//! ```toml
//! benchmark = "^IXIC"
//! analysis = ["CL=F", "^IXIC", "GC=F"]
//!
//! [[instruments]]
//! symbol = "CL=F"
//! name = "Crude Oil"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Suffix Yahoo uses for continuous futures contracts.
const FUTURES_SUFFIX: &str = "=F";

/// A single downloadable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Provider symbol, e.g. `CL=F`.
    pub symbol: String,
    /// Human-readable name used in chart titles and legends.
    pub name: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// Key used to name the instrument's CSV file.
    pub fn file_key(&self) -> String {
        file_key(&self.symbol)
    }
}

/// Strip the futures suffix from a symbol: `CL=F` -> `CL`.
///
/// Other symbols (`^IXIC`, `EURUSD=X`) are returned unchanged.
pub fn file_key(symbol: &str) -> String {
    symbol.replace(FUTURES_SUFFIX, "")
}

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("universe has no instruments")]
    Empty,

    #[error("'{0}' is listed in the universe but not defined as an instrument")]
    UnknownSymbol(String),
}

/// The complete instrument universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub instruments: Vec<Instrument>,
    /// Symbols included in the comparative charts. Empty means all.
    #[serde(default)]
    pub analysis: Vec<String>,
    /// Symbol the rolling and side-by-side charts compare against.
    #[serde(default)]
    pub benchmark: Option<String>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Self = toml::from_str(content)?;
        universe.validate()?;
        Ok(universe)
    }

    /// Every symbol referenced by `analysis` or `benchmark` must be defined.
    pub fn validate(&self) -> Result<(), UniverseError> {
        if self.instruments.is_empty() {
            return Err(UniverseError::Empty);
        }
        let referenced = self.analysis.iter().chain(self.benchmark.iter());
        for symbol in referenced {
            if self.by_symbol(symbol).is_none() {
                return Err(UniverseError::UnknownSymbol(symbol.clone()));
            }
        }
        Ok(())
    }

    /// The default commodities / index / FX set.
    pub fn default_set() -> Self {
        let instruments = vec![
            Instrument::new("CL=F", "Crude Oil"),
            Instrument::new("^IXIC", "NASDAQ"),
            Instrument::new("GC=F", "Gold"),
            Instrument::new("SI=F", "Silver"),
            Instrument::new("HG=F", "Copper"),
            Instrument::new("EURUSD=X", "EURUSD"),
        ];

        Self {
            instruments,
            analysis: vec![
                "CL=F".into(),
                "^IXIC".into(),
                "GC=F".into(),
                "EURUSD=X".into(),
            ],
            benchmark: Some("^IXIC".into()),
        }
    }

    fn by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    /// Find an instrument by symbol, file key, or case-insensitive name.
    pub fn lookup(&self, query: &str) -> Option<&Instrument> {
        self.by_symbol(query).or_else(|| {
            self.instruments
                .iter()
                .find(|i| i.file_key() == query || i.name.eq_ignore_ascii_case(query))
        })
    }

    /// Instruments that take part in the comparative charts, in universe order.
    pub fn analysis_set(&self) -> Vec<&Instrument> {
        if self.analysis.is_empty() {
            return self.instruments.iter().collect();
        }
        self.instruments
            .iter()
            .filter(|i| self.analysis.contains(&i.symbol))
            .collect()
    }

    /// The benchmark instrument, if one is configured.
    pub fn benchmark(&self) -> Option<&Instrument> {
        self.benchmark.as_deref().and_then(|s| self.by_symbol(s))
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_set()
    }
}
