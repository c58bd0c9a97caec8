//! Shared domain types for the scenario forecasting engine.
//!
//! This module provides:
//! - [`Region`]: validated market-zone identifier
//! - [`MarketRecord`] / [`MarketDataset`]: the loaded historical table
//! - [`ForecastRow`], [`ShockRow`], [`DeltaRecord`]: per-run output rows

mod forecast;
mod market;
mod region;

pub use forecast::{DeltaRecord, DeltaSummary, ForecastRow, ShockRow};
pub use market::{MarketDataset, MarketRecord};
pub use region::{Region, RegionError};
