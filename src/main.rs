//! Multi-chain wallet balance checker
//!
//! Retrieves token balances, DeFi pool positions and total net worth for a
//! batch of wallets from a rate-limited, signed HTTP API.
//!
//! # Architecture Overview
//!
//! ```text
//!   wallets.txt ──▶ ┌──────────────┐   tasks    ┌────────────┐
//!                   │ orchestrator │──────────▶ │ task queue │
//!                   │   (phases)   │            └─────┬──────┘
//!                   └──────┬───────┘                  │ pop
//!                          │ discovery                ▼
//!                          │ (own client)     ┌───────────────┐   signed HTTP   ┌─────────┐
//!                          │                  │ worker × N    │ ──────────────▶ │   API   │
//!                          │                  │ ApiClient     │ ◀────────────── │         │
//!                          │                  │ + signer proc │                 └─────────┘
//!                          │                  └──────┬────────┘
//!                          │   results (barrier)     │
//!                          ◀─────────────────────────┘
//!                          │
//!                          ▼
//!                   ┌──────────────┐
//!                   │  aggregate   │──▶ JSON report (file or stdout)
//!                   │  + totals    │
//!                   └──────────────┘
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use balance_checker::config::{self, validation::validate_config, ConfigError, SelectionMode};
use balance_checker::model::load_wallets;
use balance_checker::observability::logging;
use balance_checker::signing::process_signer_factory;
use balance_checker::{CheckerConfig, Orchestrator};

#[derive(Debug, Parser)]
#[command(name = "balance-checker", version, about = "Check wallet balances across chains and DeFi pools")]
struct Cli {
    /// Configuration file (TOML). Defaults are used when it does not exist.
    #[arg(short, long, default_value = "balance-checker.toml")]
    config: PathBuf,

    /// Wallet list, one address per line.
    #[arg(short, long)]
    wallets: Option<PathBuf>,

    /// Only report coins with this ticker, e.g. ETH.
    #[arg(long)]
    ticker: Option<String>,

    /// Number of concurrent workers.
    #[arg(long)]
    workers: Option<usize>,

    /// Drop chain balance entries worth this many USD or less.
    #[arg(long)]
    min_usd: Option<f64>,

    /// Chain id or pool name to fetch (repeatable). Disables auto selection.
    #[arg(short, long = "target")]
    targets: Vec<String>,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not draw progress bars.
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn apply(&self, config: &mut CheckerConfig) {
        if let Some(wallets) = &self.wallets {
            config.wallets_file = wallets.display().to_string();
        }
        if let Some(ticker) = &self.ticker {
            config.selection.ticker = Some(ticker.clone());
        }
        if let Some(workers) = self.workers {
            config.workers.count = workers;
        }
        if let Some(min_usd) = self.min_usd {
            config.selection.min_usd = min_usd;
        }
        if !self.targets.is_empty() {
            config.selection.mode = SelectionMode::Configured;
            config.selection.targets = self.targets.clone();
        }
        if self.no_progress {
            config.observability.progress = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load_or_default(&cli.config)?;
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability)?;
    tracing::info!("balance-checker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        api = %config.api.base_url,
        workers = config.workers.count,
        mode = ?config.selection.mode,
        ticker = ?config.selection.ticker,
        "Configuration loaded"
    );

    let wallets = load_wallets(Path::new(&config.wallets_file))?;
    let started = Instant::now();

    let signers = process_signer_factory(config.signer.clone());
    let mut orchestrator = Orchestrator::new(config, signers);
    let report = orchestrator.run(&wallets).await?;

    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    tracing::info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        selected_usd = report.totals.selected_usd,
        net_worth_usd = report.totals.net_worth_usd,
        "Run complete"
    );
    Ok(())
}
