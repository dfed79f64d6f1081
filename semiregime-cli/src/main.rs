//! Semiregime CLI: config scaffolding, single rebalance, and replay.
//!
//! Commands:
//! - `init-config`: write the default strategy TOML
//! - `rebalance`: run one cycle for a date against a price file (or
//!   synthetic data) and print the resulting report as JSON
//! - `replay`: run cycles over a date range on the configured cadence and
//!   save artifacts

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use semiregime_core::data::HistoryProvider;
use semiregime_runner::{
    export, generate_synthetic_history, load_price_csv, replay, CycleOutcome, HistoryStore,
    PaperBroker, RebalanceCadence, RebalanceGuard, RebalanceOrchestrator, StrategyConfig,
};

/// Calendar days of synthetic history generated before a single rebalance.
const SYNTHETIC_HISTORY_DAYS: i64 = 730;

#[derive(Parser)]
#[command(
    name = "semiregime",
    about = "Semiregime, regime-aware semiconductor long/short weights"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. info, debug).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default strategy config as TOML.
    InitConfig {
        #[arg(long, default_value = "semiregime.toml")]
        output: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Run one rebalance cycle and print the report.
    Rebalance {
        /// Path to a TOML config file. Defaults to the built-in config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV of daily closes with a `date,symbol,close` header.
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Use synthetic prices instead of a file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Rebalance date (YYYY-MM-DD). Defaults to the last date with prices.
        #[arg(long)]
        date: Option<String>,
    },
    /// Replay cycles over a date range and save artifacts.
    Replay {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        prices: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        /// Override the configured cadence: daily, weekly, monthly.
        #[arg(long)]
        cadence: Option<String>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::InitConfig { output, force } => run_init_config(&output, force),
        Commands::Rebalance {
            config,
            prices,
            synthetic,
            date,
        } => run_rebalance(config, prices, synthetic, date),
        Commands::Replay {
            config,
            prices,
            synthetic,
            start,
            end,
            cadence,
            output_dir,
        } => run_replay(config, prices, synthetic, start, end, cadence, output_dir),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }
    let text = StrategyConfig::default().to_toml()?;
    std::fs::write(output, text)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote default config to {}", output.display());
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<StrategyConfig> {
    match path {
        Some(path) => Ok(StrategyConfig::from_file(&path)?),
        None => Ok(StrategyConfig::default()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn load_store(
    config: &StrategyConfig,
    prices: Option<PathBuf>,
    synthetic: bool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HistoryStore> {
    match (prices, synthetic) {
        (Some(_), true) => bail!("--prices and --synthetic are mutually exclusive"),
        (Some(path), false) => Ok(load_price_csv(&path)?),
        (None, true) => Ok(generate_synthetic_history(
            &config.history_symbols(),
            start,
            end,
        )?),
        (None, false) => bail!("one of --prices or --synthetic is required"),
    }
}

fn run_rebalance(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    synthetic: bool,
    date: Option<String>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let requested = date.as_deref().map(parse_date).transpose()?;

    let end = requested.unwrap_or_else(|| chrono::Local::now().date_naive());
    let start = end - chrono::Duration::days(SYNTHETIC_HISTORY_DAYS);
    let store = load_store(&config, prices, synthetic, start, end)?;

    let today = match requested.or_else(|| store.dates().last().copied()) {
        Some(d) => d,
        None => bail!("price history is empty"),
    };

    let orchestrator = RebalanceOrchestrator::new(config)?;
    let mut broker = PaperBroker::new();
    for record in store.fetch_history(&orchestrator.config().history_symbols(), 1, today)? {
        broker.mark(&record.symbol, record.close);
    }

    let (_, outcome) =
        orchestrator.rebalance(today, &RebalanceGuard::new(), &store, &mut broker);
    match outcome {
        CycleOutcome::Completed(report) => {
            println!("{}", export::export_report_json(&report)?);
            Ok(())
        }
        CycleOutcome::Aborted { date, error } => bail!("rebalance for {date} aborted: {error}"),
        CycleOutcome::Skipped { date, .. } => bail!("rebalance for {date} was skipped"),
    }
}

fn run_replay(
    config_path: Option<PathBuf>,
    prices: Option<PathBuf>,
    synthetic: bool,
    start: String,
    end: String,
    cadence: Option<String>,
    output_dir: PathBuf,
) -> Result<()> {
    let config = load_config(config_path)?;
    let start = parse_date(&start)?;
    let end = parse_date(&end)?;
    if start > end {
        bail!("--start {start} is after --end {end}");
    }
    let cadence: RebalanceCadence = match cadence {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => config.schedule.cadence,
    };

    // Synthetic history starts early enough to cover the warmup.
    let warmup_days = (config.lookback_bars() as i64) * 7 / 5 + 14;
    let history_start = start - chrono::Duration::days(warmup_days);
    let store = load_store(&config, prices, synthetic, history_start, end)?;

    let orchestrator = RebalanceOrchestrator::new(config)?;
    let mut broker = PaperBroker::new();
    let summary = replay(&orchestrator, &store, &mut broker, cadence, start, end);

    info!(
        cycles = summary.cycles_run(),
        aborted = summary.aborted.len(),
        "replay finished"
    );
    print!("{}", export::generate_report(&summary));

    let run_dir = export::save_artifacts(&summary, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}
