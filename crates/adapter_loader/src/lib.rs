//! # adapter_loader: Market dataset input adapter
//!
//! Reads the historical market table from CSV, validates its schema and
//! hands a typed, sorted [`forecast_core::types::MarketDataset`] to the
//! engine layer.
//!
//! As part of the **A**dapter layer this crate owns every assumption
//! about the on-disk representation (column names, timestamp formats,
//! null encoding); the engine layer only ever sees validated records.
//!
//! # Failure modes
//!
//! - [`LoadError::Schema`] — a required column is missing or a cell
//!   cannot be parsed into its declared type
//! - [`LoadError::EmptyDataset`] — the file has a header but no rows
//! - [`LoadError::DuplicateKey`] — two rows share a
//!   `(timestamp, region)` key; duplicates always fail the load, they
//!   are never silently collapsed to the most recent occurrence

mod csv_source;
mod error;

pub use csv_source::load_market_csv;
pub use error::LoadError;
