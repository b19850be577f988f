//! PriceLab CLI: download, charts, inspect and correlations commands.
//!
//! Commands:
//! - `download` fetches daily bars from Yahoo Finance and writes one CSV per symbol
//! - `charts` renders the SVG chart set from stored CSVs
//! - `inspect` summarises each stored CSV
//! - `correlations` prints the correlation matrix of the analysis set

use anyhow::{bail, Context, Result};
use chrono::{Months, NaiveDate};
use clap::{Parser, Subcommand};
use pricelab_core::analysis::correlation_matrix;
use pricelab_core::config::AppConfig;
use pricelab_core::data::{
    download_symbols, load_universe, CsvStore, DataError, LoadOptions, StdoutProgress,
    YahooProvider,
};
use pricelab_core::render::{list_charts, render_all, RenderOptions};
use pricelab_core::universe::Instrument;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab CLI: commodity, index and FX price download and charting"
)]
struct Cli {
    /// TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily bars from Yahoo Finance and store them as CSV.
    Download {
        /// Symbols or instrument names. Defaults to the whole universe.
        symbols: Vec<String>,

        /// Years of history ending today. Ignored when --start is given.
        #[arg(long)]
        years: Option<u32>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Data directory. Overrides the config file.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Render every chart from the stored CSVs.
    Charts {
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[arg(long)]
        charts_dir: Option<PathBuf>,

        /// Rolling correlation window in trading days.
        #[arg(long)]
        window: Option<usize>,

        /// Use synthetic data for symbols without a CSV.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Summarise each stored CSV: rows, columns, date range, first closes.
    Inspect {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the correlation matrix of the analysis set.
    Correlations {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Download {
            symbols,
            years,
            start,
            end,
            data_dir,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_download(&config, symbols, years, start, end)
        }
        Commands::Charts {
            data_dir,
            charts_dir,
            window,
            synthetic,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(dir) = charts_dir {
                config.charts_dir = dir;
            }
            if let Some(w) = window {
                config.rolling_window = w;
            }
            config.validate()?;
            run_charts(&config, synthetic)
        }
        Commands::Inspect { data_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_inspect(&config)
        }
        Commands::Correlations { data_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_correlations(&config)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// `years` calendar years before `end`.
fn history_start(end: NaiveDate, years: u32) -> Result<NaiveDate> {
    years
        .checked_mul(12)
        .and_then(|months| end.checked_sub_months(Months::new(months)))
        .with_context(|| format!("{years} years before {end} is out of range"))
}

/// First 12 characters of a hash for display.
fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

fn run_download(
    config: &AppConfig,
    symbols: Vec<String>,
    years: Option<u32>,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let end_date = end
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let start_date = match start.as_deref() {
        Some(s) => parse_date(s)?,
        None => history_start(end_date, years.unwrap_or(config.years))?,
    };
    if start_date > end_date {
        bail!("start date {start_date} is after end date {end_date}");
    }

    // Unknown symbols are downloaded under their own name
    let extra: Vec<Instrument> = symbols
        .iter()
        .filter(|s| config.universe.lookup(s).is_none())
        .map(|s| Instrument::new(s.as_str(), s.as_str()))
        .collect();
    let instruments: Vec<&Instrument> = if symbols.is_empty() {
        config.universe.instruments.iter().collect()
    } else {
        let mut known: Vec<&Instrument> = symbols
            .iter()
            .filter_map(|s| config.universe.lookup(s))
            .collect();
        known.extend(extra.iter());
        known
    };
    for e in &extra {
        tracing::warn!(symbol = %e.symbol, "not in the universe, downloading anyway");
    }

    let provider = YahooProvider::new()?;
    let store = CsvStore::new(&config.data_dir);
    store.ensure_dirs()?;

    println!(
        "Downloading {} symbols ({start_date} to {end_date}) into {}",
        instruments.len(),
        store.data_dir().display()
    );
    let summary = download_symbols(
        &provider,
        &store,
        &instruments,
        start_date,
        end_date,
        &StdoutProgress,
    );

    for written in &summary.written {
        println!(
            "  {:<10} {:>6} rows  {}",
            written.symbol,
            written.rows,
            written.path.display()
        );
    }
    for (sym, err) in &summary.errors {
        eprintln!("Error for {sym}: {err}");
    }

    if summary.all_failed() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_charts(config: &AppConfig, synthetic: bool) -> Result<()> {
    let store = CsvStore::new(&config.data_dir);
    let instruments = config.universe.analysis_set();

    let today = chrono::Local::now().date_naive();
    let opts = LoadOptions {
        synthesize_missing: synthetic,
        synthetic_range: Some((
            history_start(today, config.years)?,
            today,
        )),
    };

    let loaded = load_universe(&store, &instruments, &opts);
    for (sym, err) in &loaded.failures {
        eprintln!("Skipping {sym}: {err}");
    }
    if loaded.has_synthetic() {
        println!("Note: some series are synthetic; charts do not show real prices.");
    }

    let benchmark = config.universe.benchmark().map(|b| b.symbol.as_str());
    let report = render_all(
        &loaded,
        benchmark,
        &RenderOptions {
            charts_dir: config.charts_dir.clone(),
            rolling_window: config.rolling_window,
        },
    )?;

    for (name, reason) in &report.skipped {
        eprintln!("Skipped {name}: {reason}");
    }
    println!(
        "Wrote {} charts to {}",
        report.written.len(),
        config.charts_dir.display()
    );
    for path in list_charts(&config.charts_dir)? {
        println!("  {}", path.display());
    }
    Ok(())
}

fn run_inspect(config: &AppConfig) -> Result<()> {
    let store = CsvStore::new(&config.data_dir);
    if !store.data_dir().exists() {
        println!("Data directory does not exist: {}", store.data_dir().display());
        return Ok(());
    }

    for instrument in &config.universe.instruments {
        println!("{} ({})", instrument.name, instrument.symbol);
        let bars = match store.read(&instrument.symbol) {
            Ok(bars) => bars,
            Err(e @ DataError::NotStored { .. }) => {
                println!("  {e}");
                continue;
            }
            Err(e) => {
                println!("  error: {e}");
                continue;
            }
        };

        println!("  rows:    {}", bars.len());
        match store.columns(&instrument.symbol) {
            Ok(columns) => println!("  columns: {}", columns.join(", ")),
            Err(e) => println!("  columns: unreadable ({e})"),
        }
        if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
            println!("  range:   {} to {}", first.date, last.date);
        }
        for bar in bars.iter().take(3) {
            println!("    {}  close {:.4}", bar.date, bar.close);
        }
        match store.read_meta(&instrument.symbol) {
            Ok(Some(meta)) => println!(
                "  source:  {:?}, written {}, hash {}",
                meta.source,
                meta.written_at.format("%Y-%m-%d %H:%M"),
                short_hash(&meta.data_hash)
            ),
            Ok(None) => println!("  source:  no metadata"),
            Err(e) => println!("  source:  unreadable metadata ({e})"),
        }
    }

    let stored = store.list()?;
    println!("\n{} CSV files in {}", stored.len(), store.data_dir().display());
    Ok(())
}

fn run_correlations(config: &AppConfig) -> Result<()> {
    let store = CsvStore::new(&config.data_dir);
    let loaded = load_universe(
        &store,
        &config.universe.analysis_set(),
        &LoadOptions::default(),
    );
    for (sym, err) in &loaded.failures {
        eprintln!("Skipping {sym}: {err}");
    }
    if loaded.is_empty() {
        bail!("no stored series; run `pricelab download` first");
    }

    let matrix = correlation_matrix(&loaded.series);
    let width = matrix.names.iter().map(String::len).max().unwrap_or(0).max(8);

    print!("{:width$}", "");
    for name in &matrix.names {
        print!("  {name:>width$}");
    }
    println!();
    for (i, name) in matrix.names.iter().enumerate() {
        print!("{name:width$}");
        for j in 0..matrix.len() {
            let v = matrix.get(i, j);
            if v.is_finite() {
                print!("  {v:>width$.3}");
            } else {
                print!("  {:>width$}", "n/a");
            }
        }
        println!();
    }
    Ok(())
}
