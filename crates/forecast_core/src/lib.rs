//! # forecast_core: Foundation types for the Gridcast scenario engine
//!
//! ## Layer Role
//!
//! forecast_core is the bottom layer of the workspace, providing:
//! - Domain types: `Region`, `MarketRecord`, `MarketDataset` (`types`)
//! - Forecast row types: `ForecastRow`, `ShockRow`, `DeltaRecord` (`types::forecast`)
//! - Run configuration: `RunConfig`, `ShockParams`, `ComfortBand` (`config`)
//!
//! ## Zero Dependency Principle
//!
//! The core layer has no dependencies on other workspace crates, with
//! minimal external dependencies:
//! - chrono: UTC timestamp arithmetic
//! - serde: Serialisation support for record and config types
//! - thiserror: Structured error types
//!
//! The forecasting algorithms themselves live in `forecast_engine`; the
//! core layer only defines the vocabulary they share with the input
//! adapter and the CLI.
//!
//! ## Usage Examples
//!
//! ```rust
//! use forecast_core::types::Region;
//! use forecast_core::config::RunConfig;
//!
//! let region = Region::new("NORTH").unwrap();
//! assert_eq!(region.as_str(), "NORTH");
//!
//! let config = RunConfig::builder()
//!     .input_path("fact_energy_market.csv")
//!     .output_dir("data")
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.horizon_hours(), 168);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod types;
