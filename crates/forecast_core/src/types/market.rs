//! Historical market records and the loaded dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Region;

/// One hourly observation of a regional electricity market.
///
/// Weather covariates are optional: historical exports frequently carry
/// gaps for the meteorological columns, and the estimator and simulator
/// are defined to degrade gracefully when they are absent.
///
/// `price` is intentionally not constrained to be non-negative —
/// oversupply events produce genuinely negative settlement prices in
/// the historical data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Observation hour (UTC, on the hourly grid).
    pub timestamp: DateTime<Utc>,
    /// Market zone this observation belongs to.
    pub region: Region,
    /// Settlement price in currency/MWh.
    pub price: f64,
    /// Total demand in MW.
    pub demand: f64,
    /// Ambient temperature in degrees Celsius, if recorded.
    pub temperature: Option<f64>,
    /// Solar irradiance in W/m², if recorded.
    pub solar_irradiance: Option<f64>,
    /// Wind speed in m/s, if recorded.
    pub wind_speed: Option<f64>,
}

/// The validated historical table for one forecasting run.
///
/// Holds records sorted by `(region, timestamp)` with unique keys; both
/// invariants are established by the loader before construction and
/// relied upon by the estimator (contiguous per-region slices) and by
/// the simulator (read-only sharing across parallel workers). Records
/// are immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataset {
    records: Vec<MarketRecord>,
}

impl MarketDataset {
    /// Wraps records that are already sorted by `(region, timestamp)`
    /// and free of duplicate keys.
    ///
    /// The loader is the only intended caller; it performs the sort and
    /// the duplicate scan before handing records over.
    pub fn from_sorted_records(records: Vec<MarketRecord>) -> Self {
        debug_assert!(records
            .windows(2)
            .all(|w| (&w[0].region, w[0].timestamp) < (&w[1].region, w[1].timestamp)));
        Self { records }
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all records in `(region, timestamp)` order.
    #[inline]
    pub fn records(&self) -> &[MarketRecord] {
        &self.records
    }

    /// Returns the distinct regions present, in sorted order.
    pub fn regions(&self) -> Vec<Region> {
        let mut out: Vec<Region> = Vec::new();
        for rec in &self.records {
            if out.last() != Some(&rec.region) {
                out.push(rec.region.clone());
            }
        }
        out
    }

    /// Returns the contiguous slice of records for one region.
    ///
    /// Empty if the region is not present in the dataset.
    pub fn region_records(&self, region: &Region) -> &[MarketRecord] {
        let start = self
            .records
            .partition_point(|r| r.region.as_str() < region.as_str());
        let end = self
            .records
            .partition_point(|r| r.region.as_str() <= region.as_str());
        &self.records[start..end]
    }

    /// Returns the latest timestamp observed across all regions.
    ///
    /// `None` only for an empty dataset, which the loader rejects.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).max()
    }
}
