//! Optional TOML configuration overlay.
//!
//! Every parameter the engine respects can be set in `gridcast.toml`;
//! command-line flags take precedence over the file, and the file over
//! the built-in defaults. The file is assembled into an explicit
//! [`forecast_core::config::RunConfig`] here in the service layer — the
//! engine never reads configuration from ambient process state.
//!
//! ```toml
//! seed = 42
//! horizon_hours = 168
//! min_history_hours = 336
//!
//! [shock]
//! price_uplift = 1.3
//! price_sigma = 0.1
//!
//! [comfort_band]
//! low_c = 18.0
//! high_c = 24.0
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use forecast_core::config::{ComfortBand, ShockParams};

use crate::{CliError, Result};

/// Parsed contents of `gridcast.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Master seed for the shock simulation.
    pub seed: Option<u64>,
    /// Forecast horizon in hours.
    pub horizon_hours: Option<u32>,
    /// Minimum hourly history per region.
    pub min_history_hours: Option<u32>,
    /// Shock simulation parameters.
    pub shock: Option<ShockParams>,
    /// Temperature comfort band.
    pub comfort_band: Option<ComfortBand>,
}

/// Loads the configuration overlay if the file exists.
///
/// A missing file is not an error — the default path is probed on every
/// invocation and most deployments run on built-in defaults.
pub fn load_overlay(path: &str) -> Result<FileConfig> {
    if !Path::new(path).exists() {
        debug!(path, "no configuration file; using defaults");
        return Ok(FileConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    let parsed = toml::from_str(&text).map_err(|source| CliError::ConfigParse {
        path: path.to_string(),
        source,
    })?;
    debug!(path, "loaded configuration overlay");
    Ok(parsed)
}
