//! Run command implementation.
//!
//! Assembles the effective run configuration (CLI flags over file
//! overlay over defaults), executes one forecasting run and reports the
//! published files. In dry-run mode the dataset is loaded and
//! schema-checked but nothing is forecast or written.

use tracing::info;

use forecast_core::config::RunConfig;
use forecast_engine::run_forecast;

use crate::config::load_overlay;
use crate::{CliError, Result};

/// Default master seed when neither the CLI nor the file sets one.
pub(crate) const DEFAULT_SEED: u64 = 42;

/// Run the forecast command.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config_path: &str,
    input: &str,
    output_dir: &str,
    seed: Option<u64>,
    horizon_hours: Option<u32>,
    min_history_hours: Option<u32>,
    dry_run: bool,
) -> Result<()> {
    if !std::path::Path::new(input).exists() {
        return Err(CliError::FileNotFound(input.to_string()));
    }

    let overlay = load_overlay(config_path)?;

    let mut builder = RunConfig::builder()
        .input_path(input)
        .output_dir(output_dir)
        .seed(seed.or(overlay.seed).unwrap_or(DEFAULT_SEED));
    if let Some(hours) = horizon_hours.or(overlay.horizon_hours) {
        builder = builder.horizon_hours(hours);
    }
    if let Some(hours) = min_history_hours.or(overlay.min_history_hours) {
        builder = builder.min_history_hours(hours);
    }
    if let Some(shock) = overlay.shock {
        builder = builder.shock(shock);
    }
    if let Some(band) = overlay.comfort_band {
        builder = builder.comfort_band(band);
    }
    let config = builder.build()?;

    info!("Starting forecast run");
    info!("  Input: {}", input);
    info!("  Output directory: {}", output_dir);
    info!("  Seed: {}", config.seed());
    info!("  Horizon: {} hours", config.horizon_hours());

    if dry_run {
        let dataset = adapter_loader::load_market_csv(config.input_path())?;
        info!(
            rows = dataset.len(),
            regions = dataset.regions().len(),
            "Dry run: dataset is valid, ready for execution"
        );
        return Ok(());
    }

    let report = run_forecast(&config)?;

    info!("Forecast completed successfully");
    info!(
        "  {} rows per table across {} region(s)",
        report.rows_per_table,
        report.regions.len()
    );
    for path in report.output.paths() {
        let size_kb = std::fs::metadata(path)?.len() as f64 / 1024.0;
        info!("  - {} ({:.1} KB)", path.display(), size_kb);
    }
    Ok(())
}
