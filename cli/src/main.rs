//! CalcFx keypad
//!
//! Reads keypad commands from stdin, one per line, and prints the
//! calculator screen after each.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use calcfx_calculator::Calculator;
use calcfx_common::Currency;
use calcfx_fx::{HttpRateProvider, RateSnapshotHolder};

mod config;
mod keypad;

use config::CliConfig;
use keypad::{Keypad, Outcome, HELP};

/// CalcFx CLI
#[derive(Parser, Debug)]
#[command(name = "calcfx")]
#[command(about = "Calculator with currency conversion")]
struct Args {
    /// Rate service access key
    #[arg(long)]
    access_key: Option<String>,

    /// Rate service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Source currency selected at start
    #[arg(long)]
    from: Option<String>,

    /// Target currency selected at start
    #[arg(long)]
    to: Option<String>,

    /// Do not fetch rates until asked
    #[arg(long)]
    offline: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(self, config: &mut CliConfig) {
        if let Some(key) = self.access_key {
            config.rates.access_key = key;
        }
        if let Some(url) = self.base_url {
            config.rates.base_url = url;
        }
        if let Some(code) = self.from {
            config.calculator.default_from = Currency::new(code);
        }
        if let Some(code) = self.to {
            config.calculator.default_to = Currency::new(code);
        }
        if self.offline {
            config.calculator.fetch_on_start = false;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config.json_logs |= self.json_logs;
    }
}

fn init_logging(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Logs go to stderr so the screen on stdout stays readable.
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::from_env();
    Args::parse().apply(&mut config);

    init_logging(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    if config.rates.access_key.is_empty() {
        warn!("No access key configured, the rate service will likely refuse requests");
    }

    let provider = Arc::new(HttpRateProvider::new(&config.rates)?);
    let holder = RateSnapshotHolder::new(provider, config.rates.access_key.clone());
    let calculator = Calculator::new(holder, config.calculator.clone());

    info!(
        base_url = %config.rates.base_url,
        from = %config.calculator.default_from,
        to = %config.calculator.default_to,
        "Starting CalcFx"
    );

    // The keypad polls the status on every render; no need to await the fetch.
    let _initial_fetch = calculator.start();

    let mut keypad = Keypad::new(calculator);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match keypad.run_line(&line).await {
            Ok(Outcome::Render(screen)) => println!("{}", screen),
            Ok(Outcome::Quit) => break,
            Err(e) => println!("! {}", e),
        }
    }

    info!("CalcFx shutdown complete");
    Ok(())
}
