//! Market data: fetching, cleaning, CSV storage and alignment

pub mod align;
pub mod download;
pub mod ingest;
pub mod loader;
pub mod provider;
pub mod series;
pub mod store;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_inner, align_union, AlignedCloses, AlignedPair};
pub use download::{download_symbols, DownloadSummary, DownloadedSymbol};
pub use loader::{load_universe, LoadOptions, LoadedData};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, NoProgress, RawBar,
    StdoutProgress,
};
pub use series::PriceSeries;
pub use store::{CsvStore, StoreMeta};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
