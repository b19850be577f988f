//! PriceLab Core: market data download, CSV storage, correlation analysis and
//! SVG chart rendering for a small universe of commodities, an index and an
//! FX pair.
//!
//! - `universe`: the instrument set, benchmark and analysis subset
//! - `config`: TOML application settings
//! - `data`: Yahoo Finance provider, CSV store, download and load orchestration
//! - `analysis`: percentage growth, Pearson and rolling correlation
//! - `chart`: plotters SVG charts
//! - `render`: produce the whole chart set in one call

pub mod analysis;
pub mod chart;
pub mod config;
pub mod data;
pub mod render;
pub mod universe;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: shared types cross rayon worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<data::PriceSeries>();
        require_sync::<data::PriceSeries>();
        require_send::<data::RawBar>();
        require_sync::<data::RawBar>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::LoadedData>();
        require_sync::<data::LoadedData>();
        require_send::<data::CsvStore>();
        require_sync::<data::CsvStore>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();

        require_send::<analysis::CorrelationMatrix>();
        require_sync::<analysis::CorrelationMatrix>();
        require_send::<analysis::RollingCorrelation>();
        require_sync::<analysis::RollingCorrelation>();

        require_send::<chart::ChartError>();
        require_sync::<chart::ChartError>();

        require_send::<universe::Universe>();
        require_sync::<universe::Universe>();
        require_send::<config::AppConfig>();
        require_sync::<config::AppConfig>();
    }

    /// Providers are used behind `&dyn DataProvider`; the trait must stay
    /// object safe.
    #[test]
    fn data_provider_is_object_safe() {
        fn _fetch(
            p: &dyn data::DataProvider,
            start: chrono::NaiveDate,
            end: chrono::NaiveDate,
        ) -> Result<data::FetchResult, data::DataError> {
            p.fetch("GC=F", start, end)
        }
    }
}
