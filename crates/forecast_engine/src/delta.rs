//! Delta computation: shock minus baseline, joined exactly on key.
//!
//! A pure function over the two forecast tables. Every shock row is
//! defined from a corresponding baseline row by construction, so the
//! join is exact — a key present on only one side is a
//! [`DeltaError::JoinMismatch`], never an outer join with nulls.

use std::fmt;

use thiserror::Error;

use chrono::{DateTime, Utc};
use forecast_core::types::{DeltaRecord, DeltaSummary, ForecastRow, Region, ShockRow};

/// Which table a mismatched key was absent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSide {
    /// The baseline forecast table.
    Baseline,
    /// The shock forecast table.
    Shock,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSide::Baseline => f.write_str("baseline"),
            TableSide::Shock => f.write_str("shock"),
        }
    }
}

/// Errors from delta computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeltaError {
    /// A key exists in one forecast table but not the other.
    #[error("Join mismatch: key (region {region}, {timestamp}) missing from {missing_from} table")]
    JoinMismatch {
        /// Region of the unmatched key.
        region: Region,
        /// Timestamp of the unmatched key.
        timestamp: DateTime<Utc>,
        /// Side the key was absent from.
        missing_from: TableSide,
    },
}

/// Percentage delta, `None` at an exactly-zero base.
#[inline]
fn pct(delta: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        None
    } else {
        Some(delta / base * 100.0)
    }
}

/// Computes signed and percentage deltas between shock and baseline.
///
/// Both inputs must be sorted by `(region, timestamp)`, as produced by
/// the estimator and simulator. The computation is idempotent: the same
/// inputs always yield the identical delta set.
///
/// # Errors
///
/// [`DeltaError::JoinMismatch`] on the first key found on one side only.
pub fn compute_deltas(
    baseline: &[ForecastRow],
    shock: &[ShockRow],
) -> Result<Vec<DeltaRecord>, DeltaError> {
    let mut deltas = Vec::with_capacity(baseline.len());
    let mut b_iter = baseline.iter().peekable();
    let mut s_iter = shock.iter().peekable();

    loop {
        match (b_iter.peek(), s_iter.peek()) {
            (None, None) => break,
            (Some(b), None) => {
                return Err(DeltaError::JoinMismatch {
                    region: b.region.clone(),
                    timestamp: b.timestamp,
                    missing_from: TableSide::Shock,
                });
            }
            (None, Some(s)) => {
                return Err(DeltaError::JoinMismatch {
                    region: s.region.clone(),
                    timestamp: s.timestamp,
                    missing_from: TableSide::Baseline,
                });
            }
            (Some(b), Some(s)) => {
                let b_key = (b.region.as_str(), b.timestamp);
                let s_key = (s.region.as_str(), s.timestamp);
                match b_key.cmp(&s_key) {
                    std::cmp::Ordering::Less => {
                        return Err(DeltaError::JoinMismatch {
                            region: b.region.clone(),
                            timestamp: b.timestamp,
                            missing_from: TableSide::Shock,
                        });
                    }
                    std::cmp::Ordering::Greater => {
                        return Err(DeltaError::JoinMismatch {
                            region: s.region.clone(),
                            timestamp: s.timestamp,
                            missing_from: TableSide::Baseline,
                        });
                    }
                    std::cmp::Ordering::Equal => {
                        let price_delta = s.forecast_price - b.forecast_price;
                        let demand_delta = s.forecast_demand - b.forecast_demand;
                        deltas.push(DeltaRecord {
                            timestamp: b.timestamp,
                            region: b.region.clone(),
                            price_delta,
                            price_delta_pct: pct(price_delta, b.forecast_price),
                            demand_delta,
                            demand_delta_pct: pct(demand_delta, b.forecast_demand),
                        });
                        b_iter.next();
                        s_iter.next();
                    }
                }
            }
        }
    }
    Ok(deltas)
}

/// Per-region summary statistics over a sorted delta table.
pub fn summarise(deltas: &[DeltaRecord]) -> Vec<DeltaSummary> {
    let mut summaries = Vec::new();
    let mut idx = 0;
    while idx < deltas.len() {
        let region = deltas[idx].region.clone();
        let end = deltas[idx..]
            .iter()
            .position(|d| d.region != region)
            .map_or(deltas.len(), |offset| idx + offset);
        let group = &deltas[idx..end];

        let n = group.len() as f64;
        let mut pct_sum = 0.0;
        let mut pct_count = 0usize;
        for d in group {
            if let Some(p) = d.price_delta_pct {
                pct_sum += p.abs();
                pct_count += 1;
            }
        }
        summaries.push(DeltaSummary {
            region,
            rows: group.len(),
            mean_price_delta: group.iter().map(|d| d.price_delta).sum::<f64>() / n,
            max_price_delta: group.iter().map(|d| d.price_delta).fold(f64::MIN, f64::max),
            min_price_delta: group.iter().map(|d| d.price_delta).fold(f64::MAX, f64::min),
            mean_demand_delta: group.iter().map(|d| d.demand_delta).sum::<f64>() / n,
            mean_abs_price_delta_pct: if pct_count > 0 {
                Some(pct_sum / pct_count as f64)
            } else {
                None
            },
        });
        idx = end;
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn b(region: &str, hour: u32, price: f64, demand: f64) -> ForecastRow {
        ForecastRow {
            timestamp: ts(hour),
            region: Region::new(region).unwrap(),
            forecast_price: price,
            forecast_demand: demand,
        }
    }

    fn s(region: &str, hour: u32, price: f64, demand: f64) -> ShockRow {
        ShockRow {
            timestamp: ts(hour),
            region: Region::new(region).unwrap(),
            forecast_price: price,
            forecast_demand: demand,
            volatility_multiplier: 2.5,
        }
    }

    #[test]
    fn test_worked_example_north_at_hour_h() {
        // Baseline 50 $/MWh, shock 150 $/MWh under multiplier 2.5:
        // delta 100, pct 200%.
        let deltas = compute_deltas(
            &[b("NORTH", 0, 50.0, 7000.0)],
            &[s("NORTH", 0, 150.0, 7700.0)],
        )
        .unwrap();
        assert_eq!(deltas.len(), 1);
        assert_relative_eq!(deltas[0].price_delta, 100.0);
        assert_relative_eq!(deltas[0].price_delta_pct.unwrap(), 200.0);
        assert_relative_eq!(deltas[0].demand_delta, 700.0);
        assert_relative_eq!(deltas[0].demand_delta_pct.unwrap(), 10.0);
    }

    #[test]
    fn test_zero_baseline_gives_none_pct() {
        let deltas =
            compute_deltas(&[b("NORTH", 0, 0.0, 0.0)], &[s("NORTH", 0, 25.0, 100.0)]).unwrap();
        assert_eq!(deltas[0].price_delta, 25.0);
        assert_eq!(deltas[0].price_delta_pct, None);
        assert_eq!(deltas[0].demand_delta_pct, None);
    }

    #[test]
    fn test_missing_shock_key_detected() {
        let err = compute_deltas(
            &[b("NORTH", 0, 50.0, 7000.0), b("NORTH", 1, 51.0, 7000.0)],
            &[s("NORTH", 0, 60.0, 7100.0)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DeltaError::JoinMismatch {
                missing_from: TableSide::Shock,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_baseline_key_detected() {
        let err = compute_deltas(
            &[b("NORTH", 0, 50.0, 7000.0)],
            &[s("NORTH", 0, 60.0, 7100.0), s("SOUTH", 0, 40.0, 5000.0)],
        )
        .unwrap_err();
        match err {
            DeltaError::JoinMismatch {
                region,
                missing_from,
                ..
            } => {
                assert_eq!(region.as_str(), "SOUTH");
                assert_eq!(missing_from, TableSide::Baseline);
            }
        }
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let baseline = vec![b("NORTH", 0, 50.0, 7000.0), b("NORTH", 1, 0.0, 6900.0)];
        let shock = vec![s("NORTH", 0, 65.0, 8000.0), s("NORTH", 1, -5.0, 6500.0)];
        let first = compute_deltas(&baseline, &shock).unwrap();
        let second = compute_deltas(&baseline, &shock).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summaries_group_by_region() {
        let baseline = vec![
            b("NORTH", 0, 50.0, 7000.0),
            b("NORTH", 1, 50.0, 7000.0),
            b("SOUTH", 0, 40.0, 5000.0),
        ];
        let shock = vec![
            s("NORTH", 0, 60.0, 7100.0),
            s("NORTH", 1, 40.0, 6900.0),
            s("SOUTH", 0, 50.0, 5200.0),
        ];
        let summaries = summarise(&compute_deltas(&baseline, &shock).unwrap());
        assert_eq!(summaries.len(), 2);
        let north = &summaries[0];
        assert_eq!(north.region.as_str(), "NORTH");
        assert_eq!(north.rows, 2);
        assert_relative_eq!(north.mean_price_delta, 0.0);
        assert_relative_eq!(north.max_price_delta, 10.0);
        assert_relative_eq!(north.min_price_delta, -10.0);
        assert_relative_eq!(north.mean_abs_price_delta_pct.unwrap(), 20.0);
        assert_eq!(summaries[1].region.as_str(), "SOUTH");
    }

    #[test]
    fn test_summary_pct_none_when_all_baselines_zero() {
        let baseline = vec![b("NORTH", 0, 0.0, 7000.0)];
        let shock = vec![s("NORTH", 0, 10.0, 7000.0)];
        let summaries = summarise(&compute_deltas(&baseline, &shock).unwrap());
        assert_eq!(summaries[0].mean_abs_price_delta_pct, None);
    }
}
