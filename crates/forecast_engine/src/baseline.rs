//! Baseline estimation: per-region trend plus seasonal offsets.
//!
//! For each region the estimator fits an ordinary least-squares trend
//! over the historical price and demand series (hours since the
//! region's first observation as the regressor) and adds seasonal
//! offsets computed as the mean residual per (hour-of-day, day-of-week)
//! bucket. Buckets with no observations fall back to the regional mean
//! residual, which is 0 when the region has no residuals at all.
//!
//! The fitted model is projected forward over the forecast horizon,
//! starting one hour after the latest timestamp observed anywhere in
//! the dataset so all regions share the same forecast grid.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use thiserror::Error;
use tracing::debug;

use forecast_core::types::{ForecastRow, MarketDataset, MarketRecord, Region};

/// Number of (hour-of-day, day-of-week) seasonal buckets.
const SEASONAL_BUCKETS: usize = 24 * 7;

/// Errors from baseline estimation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimatorError {
    /// A region has too little history to fit a meaningful model.
    ///
    /// Estimator errors are fatal for the whole run: a silently
    /// shrunken forecast set must never reach downstream reporting.
    #[error(
        "Insufficient history for region {region}: {observed} hourly observations, need at least {required}"
    )]
    InsufficientHistory {
        /// Region that failed the threshold.
        region: Region,
        /// Observations actually present.
        observed: usize,
        /// Configured minimum.
        required: usize,
    },
}

/// Seasonal bucket index for a timestamp: `weekday * 24 + hour`.
#[inline]
fn seasonal_bucket(ts: DateTime<Utc>) -> usize {
    ts.weekday().num_days_from_monday() as usize * 24 + ts.hour() as usize
}

/// OLS trend with hour-of-week seasonal offsets for one series.
#[derive(Debug, Clone)]
struct SeriesModel {
    /// Regressor origin: the region's first observation.
    origin: DateTime<Utc>,
    intercept: f64,
    slope: f64,
    seasonal: Vec<f64>,
}

impl SeriesModel {
    fn fit(records: &[MarketRecord], value: impl Fn(&MarketRecord) -> f64) -> Self {
        let origin = records[0].timestamp;
        let n = records.len() as f64;
        let xs: Vec<f64> = records
            .iter()
            .map(|r| hours_since(origin, r.timestamp))
            .collect();
        let ys: Vec<f64> = records.iter().map(&value).collect();

        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;
        let mut var = 0.0;
        let mut cov = 0.0;
        for (x, y) in xs.iter().zip(&ys) {
            var += (x - mean_x) * (x - mean_x);
            cov += (x - mean_x) * (y - mean_y);
        }
        // A constant regressor cannot occur with unique hourly keys,
        // but a flat series still needs a defined slope.
        let slope = if var > 0.0 { cov / var } else { 0.0 };
        let intercept = mean_y - slope * mean_x;

        let mut bucket_sum = vec![0.0; SEASONAL_BUCKETS];
        let mut bucket_count = vec![0usize; SEASONAL_BUCKETS];
        let mut residual_sum = 0.0;
        for (record, (x, y)) in records.iter().zip(xs.iter().zip(&ys)) {
            let residual = y - (intercept + slope * x);
            let bucket = seasonal_bucket(record.timestamp);
            bucket_sum[bucket] += residual;
            bucket_count[bucket] += 1;
            residual_sum += residual;
        }
        let mean_residual = residual_sum / n;
        let seasonal = bucket_sum
            .iter()
            .zip(&bucket_count)
            .map(|(sum, count)| {
                if *count > 0 {
                    sum / *count as f64
                } else {
                    mean_residual
                }
            })
            .collect();

        Self {
            origin,
            intercept,
            slope,
            seasonal,
        }
    }

    fn predict(&self, ts: DateTime<Utc>) -> f64 {
        let x = hours_since(self.origin, ts);
        self.intercept + self.slope * x + self.seasonal[seasonal_bucket(ts)]
    }
}

#[inline]
fn hours_since(origin: DateTime<Utc>, ts: DateTime<Utc>) -> f64 {
    (ts - origin).num_seconds() as f64 / 3600.0
}

/// Fits per-region models and projects them over the horizon.
///
/// Returns one [`ForecastRow`] per `(region, timestamp)` in the
/// horizon, sorted by `(region, timestamp)`. Baseline demand is floored
/// at 0; baseline price follows the fitted model unclamped.
///
/// # Errors
///
/// [`EstimatorError::InsufficientHistory`] if any region has fewer than
/// `min_history_hours` observations. The error names the region and the
/// whole run aborts — there is no per-region partial output.
pub fn estimate_baseline(
    dataset: &MarketDataset,
    horizon_hours: u32,
    min_history_hours: u32,
) -> Result<Vec<ForecastRow>, EstimatorError> {
    // The loader rejects empty datasets, so the latest timestamp exists
    // whenever this is reachable; an empty dataset yields no rows.
    let Some(latest) = dataset.latest_timestamp() else {
        return Ok(Vec::new());
    };
    let start = latest + Duration::hours(1);

    let mut rows = Vec::with_capacity(dataset.regions().len() * horizon_hours as usize);
    for region in dataset.regions() {
        let history = dataset.region_records(&region);
        if history.len() < min_history_hours as usize {
            return Err(EstimatorError::InsufficientHistory {
                region,
                observed: history.len(),
                required: min_history_hours as usize,
            });
        }

        let price_model = SeriesModel::fit(history, |r| r.price);
        let demand_model = SeriesModel::fit(history, |r| r.demand);
        debug!(
            region = %region,
            observations = history.len(),
            price_slope = price_model.slope,
            demand_slope = demand_model.slope,
            "fitted baseline model"
        );

        for step in 0..horizon_hours {
            let ts = start + Duration::hours(i64::from(step));
            rows.push(ForecastRow {
                timestamp: ts,
                region: region.clone(),
                forecast_price: price_model.predict(ts),
                forecast_demand: demand_model.predict(ts).max(0.0),
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use forecast_core::types::MarketRecord;

    fn history(
        region: &str,
        hours: usize,
        price: impl Fn(usize) -> f64,
        demand: impl Fn(usize) -> f64,
    ) -> Vec<MarketRecord> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..hours)
            .map(|i| MarketRecord {
                timestamp: start + Duration::hours(i as i64),
                region: Region::new(region).unwrap(),
                price: price(i),
                demand: demand(i),
                temperature: None,
                solar_irradiance: None,
                wind_speed: None,
            })
            .collect()
    }

    fn dataset(mut records: Vec<MarketRecord>) -> MarketDataset {
        records.sort_by(|a, b| {
            (a.region.as_str(), a.timestamp).cmp(&(b.region.as_str(), b.timestamp))
        });
        MarketDataset::from_sorted_records(records)
    }

    #[test]
    fn test_linear_series_extrapolates_exactly() {
        // Pure trend, no seasonality: residuals vanish and the forecast
        // continues the line.
        let ds = dataset(history("NORTH", 336, |i| 10.0 + 0.5 * i as f64, |_| 7000.0));
        let rows = estimate_baseline(&ds, 24, 336).unwrap();
        assert_eq!(rows.len(), 24);
        for (step, row) in rows.iter().enumerate() {
            let expected = 10.0 + 0.5 * (336 + step) as f64;
            assert_relative_eq!(row.forecast_price, expected, epsilon = 1e-6);
            assert_relative_eq!(row.forecast_demand, 7000.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_horizon_grid_starts_after_latest_observation() {
        let ds = dataset(history("NORTH", 336, |_| 50.0, |_| 7000.0));
        let rows = estimate_baseline(&ds, 4, 336).unwrap();
        let expected_start =
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(336);
        assert_eq!(rows[0].timestamp, expected_start);
        assert_eq!(rows[3].timestamp, expected_start + Duration::hours(3));
    }

    #[test]
    fn test_daily_seasonality_recovered() {
        // Flat trend with a +20 bump at hour 12 every day.
        let ds = dataset(history(
            "NORTH",
            336,
            |i| if i % 24 == 12 { 70.0 } else { 50.0 },
            |_| 7000.0,
        ));
        let rows = estimate_baseline(&ds, 24, 336).unwrap();
        let noon = rows.iter().find(|r| r.timestamp.hour() == 12).unwrap();
        let midnight = rows.iter().find(|r| r.timestamp.hour() == 0).unwrap();
        assert!(
            noon.forecast_price > midnight.forecast_price + 15.0,
            "noon {} vs midnight {}",
            noon.forecast_price,
            midnight.forecast_price
        );
    }

    #[test]
    fn test_insufficient_history_names_region() {
        // Three days of hourly data, two-week threshold.
        let mut records = history("NORTH", 336, |_| 50.0, |_| 7000.0);
        records.extend(history("SPARSE", 72, |_| 40.0, |_| 5000.0));
        let ds = dataset(records);
        let err = estimate_baseline(&ds, 24, 336).unwrap_err();
        match err {
            EstimatorError::InsufficientHistory {
                region,
                observed,
                required,
            } => {
                assert_eq!(region.as_str(), "SPARSE");
                assert_eq!(observed, 72);
                assert_eq!(required, 336);
            }
        }
    }

    #[test]
    fn test_demand_floored_at_zero() {
        // Steeply falling demand extrapolates below zero without the floor.
        let ds = dataset(history(
            "NORTH",
            336,
            |_| 50.0,
            |i| (1000.0 - 5.0 * i as f64).max(0.0),
        ));
        let rows = estimate_baseline(&ds, 168, 336).unwrap();
        assert!(rows.iter().all(|r| r.forecast_demand >= 0.0));
        assert!(rows.iter().any(|r| r.forecast_demand == 0.0));
    }

    #[test]
    fn test_empty_bucket_falls_back_to_mean_residual() {
        // 72 hours covers only 3 of 7 weekdays; the untouched buckets
        // must still produce finite forecasts via the fallback.
        let ds = dataset(history("NORTH", 72, |i| 50.0 + (i % 24) as f64, |_| 7000.0));
        let rows = estimate_baseline(&ds, 168, 48).unwrap();
        assert_eq!(rows.len(), 168);
        assert!(rows.iter().all(|r| r.forecast_price.is_finite()));
    }

    #[test]
    fn test_rows_sorted_by_region_then_timestamp() {
        let mut records = history("SOUTH", 336, |_| 40.0, |_| 5000.0);
        records.extend(history("NORTH", 336, |_| 50.0, |_| 7000.0));
        let ds = dataset(records);
        let rows = estimate_baseline(&ds, 24, 336).unwrap();
        assert_eq!(rows.len(), 48);
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.region.as_str().to_string(), r.timestamp))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
