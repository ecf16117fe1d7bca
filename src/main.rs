//! Trendcast - next-session stock trend predictor
//!
//! Fetches roughly six months of daily bars, trains a random forest on
//! engineered features and prints the predicted direction for the next
//! session together with the exchange status. Output is pretty JSON on
//! stdout; logs go to stderr.
//!
//! # Usage
//! ```sh
//! trendcast predict AAPL
//! trendcast status RELIANCE.NS
//! MODE=csv CSV_DATA_DIR=data/prices trendcast history MSFT --limit 5
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use trendcast::application::bootstrap::ServicesBootstrap;
use trendcast::config::Config;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Next-session stock trend predictor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict UP or DOWN for the next session
    Predict {
        /// Ticker symbol, e.g. AAPL or INFY.NS
        ticker: String,
    },
    /// Report whether the ticker's exchange is open right now
    Status {
        ticker: String,
    },
    /// Show stored predictions, newest first
    History {
        ticker: String,

        /// Maximum number of records
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Dump raw daily bars
    Historical {
        ticker: String,

        /// Calendar days of history
        #[arg(short, long, default_value = "30")]
        days: u32,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the JSON payload
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(
        "Trendcast {} starting: Mode={:?}, HistoryDays={}",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.data_source.history_days
    );

    let (service, _persistence) = ServicesBootstrap::build(&config).await?;

    match cli.command {
        Commands::Predict { ticker } => {
            let report = service.predict(&ticker).await?;
            info!(
                "{}: {} (confidence {:?})",
                report.ticker, report.trend, report.confidence
            );
            print_json(&report)?;
        }
        Commands::Status { ticker } => {
            print_json(&service.market_status(&ticker))?;
        }
        Commands::History { ticker, limit } => {
            print_json(&service.history(&ticker, limit).await?)?;
        }
        Commands::Historical { ticker, days } => {
            print_json(&service.historical(&ticker, days).await?)?;
        }
    }

    Ok(())
}
