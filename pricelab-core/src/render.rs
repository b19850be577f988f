//! Render the full chart set for a loaded universe.
//!
//! Candlesticks are independent per series and render on the rayon pool.
//! The comparison charts follow sequentially. A chart that fails is logged
//! and reported in [`RenderReport::skipped`]; it never stops the others.

use crate::analysis::{correlation_matrix, rolling_vs_benchmark};
use crate::chart::{self, candlestick, heatmap, lines, versus, ChartError};
use crate::data::{LoadedData, PriceSeries};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no series loaded; run `pricelab download` or pass --synthetic")]
    NoData,

    #[error("cannot create charts directory {path}: {source}")]
    ChartsDir {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot list charts in {path}: {source}")]
    List {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub charts_dir: PathBuf,
    pub rolling_window: usize,
}

/// What `render_all` produced.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    /// Chart name and the reason it was not written.
    pub skipped: Vec<(String, String)>,
}

impl RenderReport {
    fn record(&mut self, name: &str, path: PathBuf, result: Result<(), ChartError>) {
        match result {
            Ok(()) => self.written.push(path),
            Err(e) => self.skip(name, e.to_string()),
        }
    }

    fn skip(&mut self, name: &str, reason: String) {
        tracing::warn!(chart = name, %reason, "chart skipped");
        self.skipped.push((name.to_string(), reason));
    }
}

/// Produce every chart for `loaded` into `opts.charts_dir`.
///
/// `benchmark` is the symbol the versus grid and rolling correlations compare
/// against; when it is `None` or not among the loaded series, those two charts
/// are skipped.
pub fn render_all(
    loaded: &LoadedData,
    benchmark: Option<&str>,
    opts: &RenderOptions,
) -> Result<RenderReport, RenderError> {
    if loaded.is_empty() {
        return Err(RenderError::NoData);
    }
    let dir = opts.charts_dir.as_path();
    std::fs::create_dir_all(dir).map_err(|source| RenderError::ChartsDir {
        path: dir.display().to_string(),
        source,
    })?;

    let mut report = RenderReport::default();

    let candles: Vec<(String, PathBuf, Result<(), ChartError>)> = loaded
        .series
        .par_iter()
        .map(|s| {
            let path = dir.join(candlestick::file_name(s));
            let result = chart::candlestick(s, &path);
            (s.name.clone(), path, result)
        })
        .collect();
    for (name, path, result) in candles {
        report.record(&format!("{name} candlestick"), path, result);
    }

    let series = &loaded.series;

    let path = dir.join(lines::PRICE_LINES_FILE);
    report.record("price lines", path.clone(), chart::price_lines(series, &path));

    let path = dir.join(lines::GROWTH_FILE);
    report.record("percentage growth", path.clone(), chart::percentage_growth(series, &path));

    let matrix = correlation_matrix(series);
    let span = series.iter().map(PriceSeries::span_years).max().unwrap_or(0);
    let path = dir.join(heatmap::HEATMAP_FILE);
    report.record(
        "correlation heatmap",
        path.clone(),
        chart::correlation_heatmap(&matrix, span, &path),
    );

    let Some(bench) = benchmark.and_then(|b| loaded.by_symbol(b).or_else(|| loaded.get(b))) else {
        let reason = match benchmark {
            Some(b) => format!("benchmark {b} not loaded"),
            None => "no benchmark configured".to_string(),
        };
        report.skip("benchmark comparison", reason.clone());
        report.skip("rolling correlations", reason);
        return Ok(report);
    };

    let path = dir.join(versus::VERSUS_FILE);
    report.record(
        "benchmark comparison",
        path.clone(),
        chart::versus_benchmark(series, bench, &path),
    );

    match rolling_vs_benchmark(series, bench, opts.rolling_window) {
        Ok(curves) => {
            let path = dir.join(lines::ROLLING_FILE);
            report.record(
                "rolling correlations",
                path.clone(),
                chart::rolling_correlations(&curves, &path),
            );
        }
        Err(e) => report.skip("rolling correlations", e.to_string()),
    }

    Ok(report)
}

/// SVG files in `dir`, sorted by name. A missing directory lists as empty.
pub fn list_charts(dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let list_err = |source| RenderError::List {
        path: dir.display().to_string(),
        source,
    };
    let mut charts = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("svg") {
            charts.push(path);
        }
    }
    charts.sort();
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::generate_bars;
    use crate::data::DataSource;
    use chrono::NaiveDate;

    fn loaded(names: &[(&str, &str)]) -> LoadedData {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        LoadedData {
            series: names
                .iter()
                .map(|(sym, name)| {
                    PriceSeries::new(*name, *sym, DataSource::Synthetic, generate_bars(sym, start, end))
                })
                .collect(),
            failures: Vec::new(),
        }
    }

    fn opts(dir: &Path) -> RenderOptions {
        RenderOptions {
            charts_dir: dir.join("charts"),
            rolling_window: 20,
        }
    }

    #[test]
    fn renders_full_chart_set() {
        let tmp = tempfile::tempdir().unwrap();
        let data = loaded(&[("CL=F", "Crude Oil"), ("^IXIC", "NASDAQ"), ("GC=F", "Gold")]);
        let report = render_all(&data, Some("^IXIC"), &opts(tmp.path())).unwrap();

        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        // 3 candlesticks + lines + growth + heatmap + versus + rolling
        assert_eq!(report.written.len(), 8);

        let listed = list_charts(&tmp.path().join("charts")).unwrap();
        assert_eq!(listed.len(), 8);
        let names: Vec<String> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.contains(&"crude_oil_candlestick.svg".to_string()));
        assert!(names.contains(&"commodities_vs_nasdaq.svg".to_string()));
        assert!(names.contains(&"rolling_correlations.svg".to_string()));
    }

    #[test]
    fn missing_benchmark_skips_comparison_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let data = loaded(&[("CL=F", "Crude Oil"), ("GC=F", "Gold")]);
        let report = render_all(&data, Some("^IXIC"), &opts(tmp.path())).unwrap();

        assert_eq!(report.written.len(), 5);
        let skipped: Vec<&str> = report.skipped.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(skipped, vec!["benchmark comparison", "rolling correlations"]);
        assert!(report.skipped[0].1.contains("^IXIC"));
    }

    #[test]
    fn bad_window_skips_only_rolling_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let data = loaded(&[("^IXIC", "NASDAQ"), ("GC=F", "Gold")]);
        let mut o = opts(tmp.path());
        o.rolling_window = 1;
        let report = render_all(&data, Some("^IXIC"), &o).unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "rolling correlations");
        assert!(report
            .written
            .iter()
            .any(|p| p.ends_with(versus::VERSUS_FILE)));
    }

    #[test]
    fn empty_universe_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = render_all(&LoadedData::default(), None, &opts(tmp.path())).unwrap_err();
        assert!(matches!(err, RenderError::NoData));
    }

    #[test]
    fn listing_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(list_charts(&tmp.path().join("nope")).unwrap().is_empty());
    }
}
