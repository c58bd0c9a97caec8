//! Gridcast CLI - Command line operations for the scenario forecasting
//! engine.
//!
//! This is the operational entry point for scheduled forecast runs.
//!
//! # Commands
//!
//! - `gridcast run --input <csv> --output-dir <dir>` - Execute one
//!   forecasting run and publish the three tables
//! - `gridcast check` - Validate configuration and report effective
//!   parameters without running
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate orchestrates the engine
//! and adapter layers behind a command-line interface. The engine never
//! sees the CLI: scheduling, exit codes and log delivery all stop here.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

/// Gridcast scenario forecasting CLI
#[derive(Parser)]
#[command(name = "gridcast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "gridcast.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one forecasting run
    Run {
        /// Path to the historical market dataset (CSV)
        #[arg(short, long)]
        input: String,

        /// Directory the three forecast tables are written into
        #[arg(short, long, default_value = "data")]
        output_dir: String,

        /// Master seed for the shock simulation
        #[arg(short, long)]
        seed: Option<u64>,

        /// Forecast horizon in hours
        #[arg(long)]
        horizon_hours: Option<u32>,

        /// Minimum hourly history a region needs to be forecast
        #[arg(long)]
        min_history_hours: Option<u32>,

        /// Validate inputs and configuration without forecasting
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and report effective parameters
    Check,
}

fn main() -> Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            seed,
            horizon_hours,
            min_history_hours,
            dry_run,
        } => commands::run::run(
            &cli.config,
            &input,
            &output_dir,
            seed,
            horizon_hours,
            min_history_hours,
            dry_run,
        ),
        Commands::Check => commands::check::run(&cli.config),
    }
}
