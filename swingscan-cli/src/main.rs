//! SwingScan CLI — weekly swing-setup screening.
//!
//! Commands:
//! - `scan` — screen the configured universe, write the report and artifacts, deliver
//! - `inspect` — run the pipeline for one ticker and print the full result as JSON
//! - `universe` — print or write the configured universe as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use swingscan_core::data::{
    CircuitBreaker, SyntheticWeeklySource, WeeklySeriesSource, YahooWeeklySource,
};
use swingscan_runner::{
    deliver_all, init_logging, notifiers_from_settings, reporting, BatchRunner, LogFormat, Report,
    ScanSummary, ScreenConfig,
};

#[derive(Parser)]
#[command(
    name = "swingscan",
    about = "SwingScan — weekly EMA-support swing setups with RSI and MACD confirmation"
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen every ticker in the universe and publish the report.
    Scan {
        /// Path to a TOML config file. Defaults to built-in settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Universe TOML file (as written by `universe --out`) replacing the configured universe.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Use deterministic synthetic prices instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Override the report output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Override the number of worker threads.
        #[arg(long)]
        workers: Option<usize>,

        /// Skip report delivery.
        #[arg(long, default_value_t = false)]
        no_notify: bool,
    },
    /// Run the pipeline for a single ticker and print the result as JSON.
    Inspect {
        /// Ticker to inspect (e.g., RELIANCE.NS).
        ticker: String,

        /// Path to a TOML config file. Defaults to built-in settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use deterministic synthetic prices instead of Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Print the configured universe as TOML, or write it to a file.
    Universe {
        /// Path to a TOML config file. Defaults to built-in settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging(format);

    match cli.command {
        Commands::Scan {
            config,
            universe,
            synthetic,
            output_dir,
            workers,
            no_notify,
        } => run_scan(config, universe, synthetic, output_dir, workers, no_notify),
        Commands::Inspect {
            ticker,
            config,
            synthetic,
        } => run_inspect(&ticker, config, synthetic),
        Commands::Universe { config, out } => run_universe(config, out),
    }
}

fn load_config(path: Option<&Path>) -> Result<ScreenConfig> {
    match path {
        Some(p) => ScreenConfig::load(Some(p))
            .with_context(|| format!("failed to load config from {}", p.display())),
        None => ScreenConfig::load(None).context("invalid built-in config"),
    }
}

fn build_source(config: &ScreenConfig, synthetic: bool) -> Result<Box<dyn WeeklySeriesSource>> {
    if synthetic {
        return Ok(Box::new(SyntheticWeeklySource::ten_years()));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let timeout = Duration::from_secs(config.runner.fetch_timeout_secs);
    let source = YahooWeeklySource::new(circuit_breaker, timeout)
        .context("failed to build Yahoo Finance client")?;
    Ok(Box::new(source))
}

fn run_scan(
    config_path: Option<PathBuf>,
    universe_path: Option<PathBuf>,
    synthetic: bool,
    output_dir: Option<PathBuf>,
    workers: Option<usize>,
    no_notify: bool,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(path) = universe_path {
        config
            .set_universe_file(&path)
            .with_context(|| format!("failed to load universe from {}", path.display()))?;
    }
    if let Some(dir) = output_dir {
        config.report.output_dir = dir;
    }
    if let Some(n) = workers {
        config.runner.workers = n;
    }

    let source = build_source(&config, synthetic)?;
    let runner = BatchRunner::new(source.as_ref(), &config)?;
    let summary = runner.run()?;
    let report = Report::build(&summary, &config.report);

    print_summary(&summary, &config);

    let run_dir = reporting::save_artifacts(&summary, &report, &config.report.output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    if no_notify {
        return Ok(());
    }

    let notifiers = notifiers_from_settings(
        &config.notify,
        Duration::from_secs(config.runner.fetch_timeout_secs),
    );
    if notifiers.is_empty() {
        println!("No notifiers configured; report not delivered.");
        return Ok(());
    }
    for delivery in deliver_all(&notifiers, &report, &config.notify.recipients) {
        match delivery.result {
            Ok(target) => println!("Delivered via {}: {target}", delivery.notifier),
            Err(e) => eprintln!("Delivery via {} failed: {e}", delivery.notifier),
        }
    }

    Ok(())
}

fn run_inspect(ticker: &str, config_path: Option<PathBuf>, synthetic: bool) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let source = build_source(&config, synthetic)?;
    let runner = BatchRunner::new(source.as_ref(), &config)?;

    let result = runner.screen(ticker.trim());
    let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
    println!("{json}");
    Ok(())
}

fn run_universe(config_path: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let toml = config
        .universe
        .to_toml()
        .context("failed to serialize universe")?;

    match out {
        Some(path) => {
            std::fs::write(&path, toml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Wrote {} tickers to {}",
                config.universe.len(),
                path.display()
            );
        }
        None => print!("{toml}"),
    }
    Ok(())
}

fn print_summary(summary: &ScanSummary, config: &ScreenConfig) {
    let opportunities = summary.opportunities();

    println!();
    println!("=== {} Swing Scan ===", summary.universe);
    println!("Source:       {}", summary.source);
    println!("Screened:     {}", summary.screened_count());
    println!("Skipped:      {}", summary.skipped().len());
    println!("Fetch errors: {}", summary.failed_count());
    println!("Elapsed:      {} ms", summary.elapsed_ms);
    println!(
        "Config:       {}",
        &summary.config_fingerprint[..summary.config_fingerprint.len().min(12)]
    );
    println!();

    if opportunities.is_empty() {
        println!("No opportunities found.");
        println!();
        return;
    }

    println!(
        "{:<14} {:<10} {:>10} {:>8} {:>8} {:>7}",
        "Ticker", "Rating", "Close", "Support", "Dist %", "RSI"
    );
    println!("{}", "-".repeat(62));
    for opp in &opportunities {
        println!(
            "{:<14} {:<10} {:>10.2} {:>8} {:>8.2} {:>7.2}",
            opp.ticker(),
            opp.rating(config.criteria.strong_below_pct).to_string(),
            opp.current_close(),
            format!("EMA{}", opp.support().period),
            opp.support().distance_pct,
            opp.momentum(),
        );
    }
    println!();
}
