//! Output validation gate.
//!
//! Runs after delta computation and before the writer. All invariants
//! are checked and every violation found is accumulated into one
//! [`ValidationError`], so an operator sees the complete damage report
//! in a single failure instead of replaying the run invariant by
//! invariant. A validation failure is fatal and non-partial: nothing is
//! published.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use forecast_core::types::{DeltaRecord, ForecastRow, Region, ShockRow};

/// Absolute tolerance for delta arithmetic re-checks.
pub const DELTA_TOLERANCE: f64 = 1e-9;

/// The three published tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `forecast_baseline`.
    Baseline,
    /// `forecast_scenario_shock`.
    Shock,
    /// `forecast_scenario_delta`.
    Delta,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Baseline => f.write_str("baseline"),
            Table::Shock => f.write_str("shock"),
            Table::Delta => f.write_str("delta"),
        }
    }
}

/// One violated output invariant, with enough location detail for an
/// operator to act on without reading engine internals.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    /// The three tables disagree on row count.
    #[error("row counts differ: baseline={baseline}, shock={shock}, delta={delta}")]
    RowCountMismatch {
        /// Baseline row count.
        baseline: usize,
        /// Shock row count.
        shock: usize,
        /// Delta row count.
        delta: usize,
    },

    /// A table is not sorted by `(region, timestamp)`.
    #[error("{table} table is not sorted by (region, timestamp)")]
    UnsortedTable {
        /// Offending table.
        table: Table,
    },

    /// A table holds the same key twice.
    #[error("{table} table has duplicate key (region {region}, {timestamp})")]
    DuplicateKey {
        /// Offending table.
        table: Table,
        /// Duplicated region.
        region: Region,
        /// Duplicated timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A key exists in one table but not its counterpart.
    #[error("key (region {region}, {timestamp}) is missing from the {missing_from} table")]
    KeyMismatch {
        /// Region of the unmatched key.
        region: Region,
        /// Timestamp of the unmatched key.
        timestamp: DateTime<Utc>,
        /// Table the key is absent from.
        missing_from: Table,
    },

    /// A forecast demand is negative.
    #[error("{table} demand is negative at (region {region}, {timestamp}): {value}")]
    NegativeDemand {
        /// Offending table.
        table: Table,
        /// Region of the offending row.
        region: Region,
        /// Timestamp of the offending row.
        timestamp: DateTime<Utc>,
        /// The negative value.
        value: f64,
    },

    /// A forecast value is NaN or infinite.
    #[error("{table} {column} is not finite at (region {region}, {timestamp})")]
    NonFinite {
        /// Offending table.
        table: Table,
        /// Offending column.
        column: &'static str,
        /// Region of the offending row.
        region: Region,
        /// Timestamp of the offending row.
        timestamp: DateTime<Utc>,
    },

    /// A delta row disagrees with shock − baseline beyond tolerance.
    #[error(
        "delta {column} inconsistent at (region {region}, {timestamp}): expected {expected}, found {actual}"
    )]
    DeltaInconsistent {
        /// Offending column.
        column: &'static str,
        /// Region of the offending row.
        region: Region,
        /// Timestamp of the offending row.
        timestamp: DateTime<Utc>,
        /// Value recomputed from shock − baseline.
        expected: f64,
        /// Value found in the delta row.
        actual: f64,
    },

    /// A percentage delta is present/absent inconsistently with a zero
    /// baseline value.
    #[error("delta {column} definedness inconsistent at (region {region}, {timestamp})")]
    PctDefinedness {
        /// Offending column.
        column: &'static str,
        /// Region of the offending row.
        region: Region,
        /// Timestamp of the offending row.
        timestamp: DateTime<Utc>,
    },
}

/// Aggregate validation failure: every violated invariant found.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// The accumulated violations, in detection order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Validation failed with {} violation(s):",
            self.violations.len()
        )?;
        for violation in &self.violations {
            writeln!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

type Key<'a> = (&'a str, DateTime<Utc>);

fn check_order<'a>(
    keys: impl Iterator<Item = (Key<'a>, &'a Region)>,
    table: Table,
    out: &mut Vec<Violation>,
) {
    let mut prev: Option<(Key<'a>, &'a Region)> = None;
    for (key, region) in keys {
        if let Some((prev_key, _)) = prev {
            if key == prev_key {
                out.push(Violation::DuplicateKey {
                    table,
                    region: region.clone(),
                    timestamp: key.1,
                });
            } else if key < prev_key {
                out.push(Violation::UnsortedTable { table });
                return;
            }
        }
        prev = Some((key, region));
    }
}

fn check_key_parity<'a>(
    left: &[(Key<'a>, &'a Region)],
    right: &[(Key<'a>, &'a Region)],
    left_table: Table,
    right_table: Table,
    out: &mut Vec<Violation>,
) {
    let right_set: HashMap<Key<'a>, ()> = right.iter().map(|(k, _)| (*k, ())).collect();
    for (key, region) in left {
        if !right_set.contains_key(key) {
            out.push(Violation::KeyMismatch {
                region: (*region).clone(),
                timestamp: key.1,
                missing_from: right_table,
            });
        }
    }
    let left_set: HashMap<Key<'a>, ()> = left.iter().map(|(k, _)| (*k, ())).collect();
    for (key, region) in right {
        if !left_set.contains_key(key) {
            out.push(Violation::KeyMismatch {
                region: (*region).clone(),
                timestamp: key.1,
                missing_from: left_table,
            });
        }
    }
}

fn check_finite(
    value: f64,
    table: Table,
    column: &'static str,
    region: &Region,
    timestamp: DateTime<Utc>,
    out: &mut Vec<Violation>,
) {
    if !value.is_finite() {
        out.push(Violation::NonFinite {
            table,
            column,
            region: region.clone(),
            timestamp,
        });
    }
}

/// Enforces the output invariants over the three tables.
///
/// # Errors
///
/// A [`ValidationError`] carrying **all** violations found; the check
/// never stops at the first failure.
pub fn validate(
    baseline: &[ForecastRow],
    shock: &[ShockRow],
    deltas: &[DeltaRecord],
) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if baseline.len() != shock.len() || baseline.len() != deltas.len() {
        violations.push(Violation::RowCountMismatch {
            baseline: baseline.len(),
            shock: shock.len(),
            delta: deltas.len(),
        });
    }

    let b_keys: Vec<(Key, &Region)> = baseline
        .iter()
        .map(|r| ((r.region.as_str(), r.timestamp), &r.region))
        .collect();
    let s_keys: Vec<(Key, &Region)> = shock
        .iter()
        .map(|r| ((r.region.as_str(), r.timestamp), &r.region))
        .collect();
    let d_keys: Vec<(Key, &Region)> = deltas
        .iter()
        .map(|r| ((r.region.as_str(), r.timestamp), &r.region))
        .collect();

    check_order(b_keys.iter().cloned(), Table::Baseline, &mut violations);
    check_order(s_keys.iter().cloned(), Table::Shock, &mut violations);
    check_order(d_keys.iter().cloned(), Table::Delta, &mut violations);

    check_key_parity(&b_keys, &s_keys, Table::Baseline, Table::Shock, &mut violations);
    check_key_parity(&b_keys, &d_keys, Table::Baseline, Table::Delta, &mut violations);

    for row in baseline {
        check_finite(row.forecast_price, Table::Baseline, "forecast_price", &row.region, row.timestamp, &mut violations);
        check_finite(row.forecast_demand, Table::Baseline, "forecast_demand", &row.region, row.timestamp, &mut violations);
        if row.forecast_demand < 0.0 {
            violations.push(Violation::NegativeDemand {
                table: Table::Baseline,
                region: row.region.clone(),
                timestamp: row.timestamp,
                value: row.forecast_demand,
            });
        }
    }
    for row in shock {
        check_finite(row.forecast_price, Table::Shock, "forecast_price", &row.region, row.timestamp, &mut violations);
        check_finite(row.forecast_demand, Table::Shock, "forecast_demand", &row.region, row.timestamp, &mut violations);
        check_finite(row.volatility_multiplier, Table::Shock, "volatility_multiplier", &row.region, row.timestamp, &mut violations);
        if row.forecast_demand < 0.0 {
            violations.push(Violation::NegativeDemand {
                table: Table::Shock,
                region: row.region.clone(),
                timestamp: row.timestamp,
                value: row.forecast_demand,
            });
        }
    }

    // Delta arithmetic re-check for keys present in all three tables.
    let shock_by_key: HashMap<Key, &ShockRow> = shock
        .iter()
        .map(|r| ((r.region.as_str(), r.timestamp), r))
        .collect();
    let delta_by_key: HashMap<Key, &DeltaRecord> = deltas
        .iter()
        .map(|r| ((r.region.as_str(), r.timestamp), r))
        .collect();
    for b in baseline {
        let key = (b.region.as_str(), b.timestamp);
        let (Some(s), Some(d)) = (shock_by_key.get(&key), delta_by_key.get(&key)) else {
            continue;
        };
        let checks = [
            ("price_delta", s.forecast_price - b.forecast_price, d.price_delta),
            ("demand_delta", s.forecast_demand - b.forecast_demand, d.demand_delta),
        ];
        for (column, expected, actual) in checks {
            if (expected - actual).abs() > DELTA_TOLERANCE {
                violations.push(Violation::DeltaInconsistent {
                    column,
                    region: b.region.clone(),
                    timestamp: b.timestamp,
                    expected,
                    actual,
                });
            }
        }
        let definedness = [
            ("price_delta_pct", b.forecast_price, d.price_delta_pct.is_some()),
            ("demand_delta_pct", b.forecast_demand, d.demand_delta_pct.is_some()),
        ];
        for (column, base, defined) in definedness {
            if defined == (base == 0.0) {
                violations.push(Violation::PctDefinedness {
                    column,
                    region: b.region.clone(),
                    timestamp: b.timestamp,
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        warn!(count = violations.len(), "output validation failed");
        Err(ValidationError { violations })
    }
}
