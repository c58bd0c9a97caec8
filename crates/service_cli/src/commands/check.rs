//! Check command implementation.
//!
//! Validates the configuration overlay and reports the effective
//! parameters a run would use, without touching any dataset.

use tracing::info;

use forecast_core::config::{RunConfig, DEFAULT_HORIZON_HOURS, DEFAULT_MIN_HISTORY_HOURS};

use crate::commands::run::DEFAULT_SEED;
use crate::config::load_overlay;
use crate::Result;

/// Run the check command.
pub fn run(config_path: &str) -> Result<()> {
    let overlay = load_overlay(config_path)?;

    // Same parameter validation a real run performs, minus the paths a
    // check has no business inventing.
    let mut builder = RunConfig::builder();
    if let Some(hours) = overlay.horizon_hours {
        builder = builder.horizon_hours(hours);
    }
    if let Some(hours) = overlay.min_history_hours {
        builder = builder.min_history_hours(hours);
    }
    if let Some(shock) = overlay.shock {
        builder = builder.shock(shock);
    }
    if let Some(band) = overlay.comfort_band {
        builder = builder.comfort_band(band);
    }
    builder.check_parameters()?;

    let shock = overlay.shock.unwrap_or_default();
    let band = overlay.comfort_band.unwrap_or_default();
    info!("Configuration is valid");
    info!("  Seed: {}", overlay.seed.unwrap_or(DEFAULT_SEED));
    info!(
        "  Horizon: {} hours",
        overlay.horizon_hours.unwrap_or(DEFAULT_HORIZON_HOURS)
    );
    info!(
        "  Minimum history: {} hours",
        overlay.min_history_hours.unwrap_or(DEFAULT_MIN_HISTORY_HOURS)
    );
    info!(
        "  Shock: price x{} +/- {}, demand x{} +/- {}",
        shock.price_uplift, shock.price_sigma, shock.demand_uplift, shock.demand_sigma
    );
    info!(
        "  Volatility: base {}, {}/degC outside [{}, {}] degC, cap {}",
        shock.base_multiplier,
        shock.temperature_sensitivity,
        band.low_c,
        band.high_c,
        shock.max_multiplier
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    #[test]
    fn test_check_accepts_overlay_without_paths() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 7\nhorizon_hours = 24").unwrap();
        assert!(super::run(file.path().to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_check_rejects_invalid_parameters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "horizon_hours = 0").unwrap();
        let err = super::run(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, crate::CliError::Config(_)));
    }
}
