//! Per-run forecast output rows.
//!
//! All three row types share the `(region, timestamp)` key and are
//! recreated from scratch on every run; none of them is ever treated as
//! a source of truth across invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Region;

/// One baseline forecast row: the expected market state at a future
/// hour absent stress events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Forecast hour (UTC).
    pub timestamp: DateTime<Utc>,
    /// Market zone.
    pub region: Region,
    /// Expected price in currency/MWh.
    pub forecast_price: f64,
    /// Expected demand in MW (never negative).
    pub forecast_demand: f64,
}

/// One shock-scenario row: the baseline perturbed by a weather-scaled
/// stochastic shock.
///
/// Every shock row references the baseline row with the same
/// `(region, timestamp)` key; the validation gate enforces this before
/// anything is written. `forecast_price` may be negative (oversupply
/// stress) but `forecast_demand` is floored at zero by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockRow {
    /// Forecast hour (UTC).
    pub timestamp: DateTime<Utc>,
    /// Market zone.
    pub region: Region,
    /// Shocked price in currency/MWh.
    pub forecast_price: f64,
    /// Shocked demand in MW (never negative).
    pub forecast_demand: f64,
    /// The volatility multiplier used to generate this row.
    pub volatility_multiplier: f64,
}

/// One delta row: the signed and percentage differences between the
/// shock and baseline rows for a key.
///
/// Percentage deltas are `None` when the corresponding baseline value
/// is exactly zero — a division error is never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// Forecast hour (UTC).
    pub timestamp: DateTime<Utc>,
    /// Market zone.
    pub region: Region,
    /// `shock_price - baseline_price`.
    pub price_delta: f64,
    /// `price_delta / baseline_price * 100`, or `None` at zero baseline.
    pub price_delta_pct: Option<f64>,
    /// `shock_demand - baseline_demand`.
    pub demand_delta: f64,
    /// `demand_delta / baseline_demand * 100`, or `None` at zero baseline.
    pub demand_delta_pct: Option<f64>,
}

/// Per-region summary statistics over a delta table.
///
/// Reported in the run result and logged for operators; not part of the
/// three published tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaSummary {
    /// Market zone the summary covers.
    pub region: Region,
    /// Number of delta rows for the region.
    pub rows: usize,
    /// Mean of `price_delta` across the region's rows.
    pub mean_price_delta: f64,
    /// Largest `price_delta` observed.
    pub max_price_delta: f64,
    /// Smallest `price_delta` observed.
    pub min_price_delta: f64,
    /// Mean of `demand_delta` across the region's rows.
    pub mean_demand_delta: f64,
    /// Mean absolute `price_delta_pct` over rows where it is defined,
    /// or `None` if every baseline price in the region was zero.
    pub mean_abs_price_delta_pct: Option<f64>,
}
