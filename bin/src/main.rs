//! CLI for the alpha101 factor engine.
//!
//! Reads per-symbol daily OHLCV CSVs from the data root, builds the feature
//! pre-pass, computes factors and backtests them, writing every artifact back
//! as CSV.

mod config;
mod io;

use alpha101::{
    BacktestConfig, BacktestReport, FactorInfo, FactorRegistry, Panel, build_features, compute_factors,
    run_backtest,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use config::{AppConfig, DataDirs};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "alpha101")]
#[command(about = "Alpha101 factor computation and IC backtests", long_about = None)]
#[command(version)]
struct Cli {
    /// Root of the data directory tree
    #[arg(long, env = "ALPHA101_DATA_ROOT", global = true)]
    data_root: Option<PathBuf>,

    /// TOML file with `[features]` and `[backtest]` tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to the console only
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all available factors
    List {
        /// Print factor metadata as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show information about a specific factor
    Info {
        /// Factor name
        factor: String,
    },
    /// Build returns, vwap and adv features from the klines
    Features,
    /// Compute factors from the feature files
    Compute {
        /// Factors to compute; all registered factors when omitted
        #[arg(long, num_args = 1..)]
        factor: Vec<String>,
    },
    /// Backtest a computed factor against forward returns
    Backtest {
        /// Factor name (reads `factors/<name>.csv`)
        #[arg(long)]
        factor: String,
        /// Forward return horizon in trading days
        #[arg(long)]
        horizon: Option<usize>,
        /// Number of quantile buckets
        #[arg(long)]
        quantiles: Option<usize>,
    },
}

fn init_tracing(dirs: &DataDirs, file_log: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    if !file_log {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init()
            .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;
        return Ok(None);
    }

    let log_dir = dirs.logs();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "alpha101.log"));
    let file_layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;
    Ok(Some(guard))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::load(cli.config.as_deref())?;
    let dirs = DataDirs::resolve(cli.data_root, &app);

    let file_log = !cli.no_file_log && !matches!(cli.command, Commands::List { .. } | Commands::Info { .. });
    let _guard = init_tracing(&dirs, file_log)?;

    let registry = FactorRegistry::global()?;
    match cli.command {
        Commands::List { json } => list_factors(registry, json),
        Commands::Info { factor } => show_factor_info(registry, &factor),
        Commands::Features => build_feature_files(&dirs, &app),
        Commands::Compute { factor } => compute_factor_files(registry, &dirs, factor),
        Commands::Backtest {
            factor,
            horizon,
            quantiles,
        } => {
            let config = BacktestConfig {
                horizon: horizon.unwrap_or(app.backtest.horizon),
                quantiles: quantiles.unwrap_or(app.backtest.quantiles),
                ..app.backtest.clone()
            };
            backtest_factor(&dirs, &factor, &config)
        }
    }
}

/// List all available factors grouped by category.
fn list_factors(registry: &FactorRegistry, json: bool) -> Result<()> {
    let all_info = registry.all_info();
    if json {
        println!("{}", serde_json::to_string_pretty(&all_info)?);
        return Ok(());
    }

    let mut by_category: BTreeMap<String, Vec<&FactorInfo>> = BTreeMap::new();
    for info in &all_info {
        by_category.entry(info.category.to_string()).or_default().push(info);
    }

    println!("Available Factors ({} total)\n", registry.len());
    for (category, factors) in by_category {
        println!("{category}:");
        for info in factors {
            println!("  {} - {}", info.name, info.description);
        }
        println!();
    }
    Ok(())
}

/// Show detailed information about a specific factor.
fn show_factor_info(registry: &FactorRegistry, factor_name: &str) -> Result<()> {
    let info = FactorInfo::from(registry.get(factor_name)?);
    let peers = registry.by_category(info.category).len();

    println!("Factor: {}", info.name);
    println!("Category: {} ({peers} factors)", info.category);
    println!("Description: {}", info.description);
    println!("Lookback: {} periods", info.lookback);
    println!("Required columns:");
    for col in &info.required_columns {
        println!("  - {col}");
    }
    Ok(())
}

/// Build one feature file per kline file.
fn build_feature_files(dirs: &DataDirs, app: &AppConfig) -> Result<()> {
    let files = io::csv_files(&dirs.klines())?;
    info!(files = files.len(), root = %dirs.root().display(), "building features");

    let mut written = 0usize;
    for path in files {
        let Some(name) = path.file_name() else { continue };
        let built = io::read_csv(&path).and_then(|raw| Ok(build_features(&raw, &app.features)?));
        match built {
            Ok(mut features) => {
                io::write_csv(&mut features, &dirs.features().join(name))?;
                written += 1;
            }
            Err(e) => warn!(file = %path.display(), error = %e, "skipping kline file"),
        }
    }
    info!(written, "features complete");
    Ok(())
}

/// Compute the requested factors over every feature file.
fn compute_factor_files(registry: &FactorRegistry, dirs: &DataDirs, factors: Vec<String>) -> Result<()> {
    let names: Vec<String> = if factors.is_empty() {
        registry.names().into_iter().map(str::to_string).collect()
    } else {
        factors
    };

    let features = io::read_dir(&dirs.features(), None)
        .context("no feature files; run `alpha101 features` first")?;
    let panel = Panel::new(&features)?;
    info!(
        factors = names.len(),
        symbols = panel.symbol_count(),
        days = panel.timestamp_count(),
        "computing factors"
    );

    let run = compute_factors(registry, &panel, &names);
    for outcome in run.into_outcomes() {
        match outcome.result {
            Ok(mut frame) => {
                let path = dirs.factors().join(format!("{}.csv", outcome.name));
                io::write_csv(&mut frame, &path)?;
                info!(factor = %outcome.name, rows = frame.height(), path = %path.display(), "saved factor");
            }
            Err(e) => error!(factor = %outcome.name, error = %e, "factor not saved"),
        }
    }
    Ok(())
}

/// Backtest one factor file and write its daily IC, summaries and quantile
/// curves.
fn backtest_factor(dirs: &DataDirs, factor_name: &str, config: &BacktestConfig) -> Result<()> {
    let factor_path = dirs.factors().join(format!("{factor_name}.csv"));
    let factor = io::read_csv(&factor_path)
        .with_context(|| format!("factor file not found; run `alpha101 compute --factor {factor_name}` first"))?;
    let prices = io::read_dir(&dirs.klines(), Some(&["datetime", "symbol", "close"]))?;

    let report = run_backtest(&factor, &prices, config);
    log_report(factor_name, &report)?;
    write_report(dirs, factor_name, config, &report)
}

fn log_report(factor_name: &str, report: &BacktestReport) -> Result<()> {
    info!("[{factor_name} cross-sectional]\n{}", report.ic.summary_frame()?);
    info!("[{factor_name} time-series per symbol]\n{}", report.ic.ts_summary_frame()?);
    if report.quantiles.days().is_empty() {
        warn!("not enough symbols per day to form quantile portfolios");
    }
    Ok(())
}

fn write_report(dirs: &DataDirs, factor_name: &str, config: &BacktestConfig, report: &BacktestReport) -> Result<()> {
    let out = dirs.backtest();
    let (h, q) = (config.horizon, config.quantiles);

    io::write_csv(&mut report.ic.daily_frame()?, &out.join(format!("{factor_name}_daily_ic_h{h}.csv")))?;
    io::write_csv(&mut report.ic.summary_frame()?, &out.join(format!("{factor_name}_summary_h{h}.csv")))?;
    io::write_csv(
        &mut report.ic.ts_summary_frame()?,
        &out.join(format!("{factor_name}_ts_summary_h{h}.csv")),
    )?;
    if !report.quantiles.days().is_empty() {
        io::write_csv(
            &mut report.quantiles.ports_frame()?,
            &out.join(format!("{factor_name}_ports_h{h}_q{q}.csv")),
        )?;
        io::write_csv(
            &mut report.quantiles.cumulative()?,
            &out.join(format!("{factor_name}_cumrets_h{h}_q{q}.csv")),
        )?;
    }
    info!(dir = %out.display(), "backtest results saved");
    Ok(())
}
