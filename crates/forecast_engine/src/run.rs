//! The single run entry point exposed to the invoking process.
//!
//! One call is one stateless batch run: load, estimate, simulate,
//! derive, validate, publish. The engine has no knowledge of scheduling
//! or delivery — the external scheduler owns retry (each run is
//! idempotent given the same input, seed and parameters), and whatever
//! consumes the tables owns everything downstream of the output
//! directory.

use std::time::{Duration, Instant};

use tracing::{info, info_span};

use forecast_core::config::RunConfig;
use forecast_core::types::{DeltaSummary, Region};

use crate::writer::OutputFiles;
use crate::{baseline, delta, shock, validate, writer, EngineError};

/// Structured result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final locations of the three published tables.
    pub output: OutputFiles,
    /// Rows per table (identical across the three by invariant).
    pub rows_per_table: usize,
    /// Regions forecast, sorted.
    pub regions: Vec<Region>,
    /// Horizon length used, in hours.
    pub horizon_hours: u32,
    /// Master seed used for the shock simulation.
    pub seed: u64,
    /// Per-region delta summary statistics.
    pub summaries: Vec<DeltaSummary>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Executes one forecasting run under the given configuration.
///
/// # Errors
///
/// - [`EngineError::Load`] and [`EngineError::Estimator`] abort
///   immediately — no forecast is meaningful without valid input.
/// - [`EngineError::Validation`] carries every violated output
///   invariant found; nothing is published on validation failure.
/// - [`EngineError::Write`] means the atomic publish failed; no partial
///   table is left behind.
pub fn run_forecast(config: &RunConfig) -> Result<RunReport, EngineError> {
    let span = info_span!(
        "forecast_run",
        seed = config.seed(),
        horizon_hours = config.horizon_hours()
    );
    let _guard = span.enter();
    let started = Instant::now();

    let dataset = adapter_loader::load_market_csv(config.input_path())?;

    let baseline_rows = baseline::estimate_baseline(
        &dataset,
        config.horizon_hours(),
        config.min_history_hours(),
    )?;
    info!(rows = baseline_rows.len(), "baseline estimated");

    let shock_rows = shock::simulate(
        &dataset,
        &baseline_rows,
        *config.shock(),
        *config.comfort_band(),
        config.seed(),
    );

    let delta_rows = delta::compute_deltas(&baseline_rows, &shock_rows)?;
    let summaries = delta::summarise(&delta_rows);
    for summary in &summaries {
        info!(
            region = %summary.region,
            rows = summary.rows,
            mean_price_delta = summary.mean_price_delta,
            max_price_delta = summary.max_price_delta,
            "delta summary"
        );
    }

    validate::validate(&baseline_rows, &shock_rows, &delta_rows)?;

    let output = writer::write_tables(
        config.output_dir(),
        &baseline_rows,
        &shock_rows,
        &delta_rows,
    )?;

    let report = RunReport {
        output,
        rows_per_table: baseline_rows.len(),
        regions: dataset.regions(),
        horizon_hours: config.horizon_hours(),
        seed: config.seed(),
        summaries,
        elapsed: started.elapsed(),
    };
    info!(
        rows = report.rows_per_table,
        regions = report.regions.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "forecast run complete"
    );
    Ok(report)
}
