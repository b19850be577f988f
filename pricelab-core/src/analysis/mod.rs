//! Statistics over aligned price series.
//!
//! Every function here is pure: slices or series in, numbers out. NaN marks
//! a value that cannot be computed (missing data, zero variance).

pub mod correlation;
pub mod growth;

pub use correlation::{
    correlation_matrix, pearson, rolling_correlation, rolling_vs_benchmark, CorrelationMatrix,
    RollingCorrelation,
};
pub use growth::{percentage_growth, series_growth};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("rolling window must be at least 2, got {0}")]
    InvalidWindow(usize),
}
