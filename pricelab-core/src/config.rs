//! Application configuration, loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock setup: 20 years of daily bars for the default universe, CSVs under
//! `data/`, charts under `charts/`, and a 252-day rolling window.

use crate::universe::{Universe, UniverseError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trading days per year, used as the default rolling window.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Universe(#[from] UniverseError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding one CSV per symbol.
    pub data_dir: PathBuf,
    /// Directory charts are written to.
    pub charts_dir: PathBuf,
    /// Years of history to request.
    pub years: u32,
    /// Bar interval passed to the provider.
    pub interval: String,
    /// Window (in aligned observations) for rolling correlation.
    pub rolling_window: usize,
    pub universe: Universe,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            charts_dir: PathBuf::from("charts"),
            years: 20,
            interval: "1d".into(),
            rolling_window: TRADING_DAYS_PER_YEAR,
            universe: Universe::default_set(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rolling_window < 2 {
            return Err(ConfigError::Invalid(format!(
                "rolling_window must be at least 2, got {}",
                self.rolling_window
            )));
        }
        if self.years == 0 {
            return Err(ConfigError::Invalid("years must be at least 1".into()));
        }
        if self.interval != "1d" {
            return Err(ConfigError::Invalid(format!(
                "only daily bars are supported, got interval '{}'",
                self.interval
            )));
        }
        self.universe.validate()?;
        Ok(())
    }
}
