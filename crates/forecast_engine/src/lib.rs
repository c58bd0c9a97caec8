//! # forecast_engine: The scenario forecasting kernel
//!
//! Transforms a historical market dataset into three internally
//! consistent forecast tables — baseline, shock and delta — in a single
//! stateless batch pass:
//!
//! ```text
//! load → estimate baseline → simulate shock → compute deltas
//!      → validation gate → atomic table writes
//! ```
//!
//! The only public entry point intended for callers is
//! [`run::run_forecast`], which takes an explicit
//! [`forecast_core::config::RunConfig`] and returns a structured
//! [`run::RunReport`] or an [`EngineError`] naming the failing stage,
//! region and invariant. Individual stages are exported for testing and
//! for callers that want to validate inputs without forecasting.
//!
//! # Reproducibility
//!
//! The shock simulation is deterministic under a fixed seed: each row
//! draws from an RNG seeded by `(master seed, region, timestamp)`, so
//! the rayon scheduling order cannot influence the output. Two runs
//! over the same dataset with the same configuration produce
//! byte-identical tables.

pub mod baseline;
pub mod delta;
mod error;
pub mod rng;
pub mod run;
pub mod shock;
pub mod validate;
pub mod writer;

pub use error::EngineError;
pub use run::{run_forecast, RunReport};
