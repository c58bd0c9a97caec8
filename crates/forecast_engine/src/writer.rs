//! Forecast table serialisation.
//!
//! Writes the three tables with a fixed column order and RFC 3339
//! timestamps. Writes are atomic per run: every table is first
//! serialised to a `.tmp` sibling in the output directory, and only
//! after all three have been flushed successfully are they renamed into
//! place. A failure at any point removes the staged files and leaves no
//! partial or truncated final output.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use chrono::SecondsFormat;
use forecast_core::types::{DeltaRecord, ForecastRow, ShockRow};

/// Baseline table file name.
pub const BASELINE_FILE: &str = "forecast_baseline.csv";
/// Shock table file name.
pub const SHOCK_FILE: &str = "forecast_scenario_shock.csv";
/// Delta table file name.
pub const DELTA_FILE: &str = "forecast_scenario_delta.csv";

/// Errors from writing the forecast tables.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Filesystem operation failed.
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// CSV serialisation failed.
    #[error("CSV error writing {path}: {source}")]
    Csv {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Final locations of the three published tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Path of `forecast_baseline.csv`.
    pub baseline: PathBuf,
    /// Path of `forecast_scenario_shock.csv`.
    pub shock: PathBuf,
    /// Path of `forecast_scenario_delta.csv`.
    pub delta: PathBuf,
}

impl OutputFiles {
    /// The three paths in publication order.
    pub fn paths(&self) -> [&Path; 3] {
        [&self.baseline, &self.shock, &self.delta]
    }
}

#[inline]
fn format_ts(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[inline]
fn format_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv<F>(path: &Path, header: &[&str], mut write_rows: F) -> Result<(), WriteError>
where
    F: FnMut(&mut csv::Writer<fs::File>) -> Result<(), csv::Error>,
{
    let file = fs::File::create(path).map_err(|e| WriteError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(header)
        .and_then(|()| write_rows(&mut writer))
        .map_err(|e| WriteError::csv(path, e))?;
    writer
        .flush()
        .map_err(|e| WriteError::io(path, e))?;
    Ok(())
}

/// Writes the three forecast tables into `dir`, atomically.
///
/// Column orders are stable:
/// - baseline: `timestamp,region,forecast_price,forecast_demand`
/// - shock: `timestamp,region,forecast_price,forecast_demand,volatility_multiplier`
/// - delta: `timestamp,region,price_delta,price_delta_pct,demand_delta,demand_delta_pct`
///
/// `None` percentage deltas serialise as empty fields.
pub fn write_tables(
    dir: &Path,
    baseline: &[ForecastRow],
    shock: &[ShockRow],
    deltas: &[DeltaRecord],
) -> Result<OutputFiles, WriteError> {
    fs::create_dir_all(dir).map_err(|e| WriteError::io(dir, e))?;

    let staged: [(PathBuf, PathBuf); 3] = [BASELINE_FILE, SHOCK_FILE, DELTA_FILE]
        .map(|name| (dir.join(format!("{name}.tmp")), dir.join(name)));

    let result = stage_all(&staged, baseline, shock, deltas);
    if result.is_err() {
        for (tmp, _) in &staged {
            // Best-effort cleanup; the error being reported wins.
            let _ = fs::remove_file(tmp);
        }
    }
    result?;

    let mut published: Vec<&Path> = Vec::with_capacity(staged.len());
    for (tmp, final_path) in &staged {
        if let Err(source) = fs::rename(tmp, final_path) {
            // Unpublish anything renamed before the failure so a failed
            // run never leaves a partial table set behind.
            for (undo_tmp, _) in &staged {
                let _ = fs::remove_file(undo_tmp);
            }
            for done in &published {
                let _ = fs::remove_file(done);
            }
            return Err(WriteError::io(final_path, source));
        }
        published.push(final_path);
        info!(path = %final_path.display(), "published forecast table");
    }

    Ok(OutputFiles {
        baseline: staged[0].1.clone(),
        shock: staged[1].1.clone(),
        delta: staged[2].1.clone(),
    })
}

fn stage_all(
    staged: &[(PathBuf, PathBuf); 3],
    baseline: &[ForecastRow],
    shock: &[ShockRow],
    deltas: &[DeltaRecord],
) -> Result<(), WriteError> {
    write_csv(
        &staged[0].0,
        &["timestamp", "region", "forecast_price", "forecast_demand"],
        |w| {
            for row in baseline {
                w.write_record(&[
                    format_ts(row.timestamp),
                    row.region.as_str().to_string(),
                    row.forecast_price.to_string(),
                    row.forecast_demand.to_string(),
                ])?;
            }
            Ok(())
        },
    )?;

    write_csv(
        &staged[1].0,
        &[
            "timestamp",
            "region",
            "forecast_price",
            "forecast_demand",
            "volatility_multiplier",
        ],
        |w| {
            for row in shock {
                w.write_record(&[
                    format_ts(row.timestamp),
                    row.region.as_str().to_string(),
                    row.forecast_price.to_string(),
                    row.forecast_demand.to_string(),
                    row.volatility_multiplier.to_string(),
                ])?;
            }
            Ok(())
        },
    )?;

    write_csv(
        &staged[2].0,
        &[
            "timestamp",
            "region",
            "price_delta",
            "price_delta_pct",
            "demand_delta",
            "demand_delta_pct",
        ],
        |w| {
            for row in deltas {
                w.write_record(&[
                    format_ts(row.timestamp),
                    row.region.as_str().to_string(),
                    row.price_delta.to_string(),
                    format_opt(row.price_delta_pct),
                    row.demand_delta.to_string(),
                    format_opt(row.demand_delta_pct),
                ])?;
            }
            Ok(())
        },
    )?;

    Ok(())
}
