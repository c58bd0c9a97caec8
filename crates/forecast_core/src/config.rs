//! Run configuration for the scenario forecasting engine.
//!
//! Configuration is an explicit value passed into the run entry point —
//! the engine never reads ambient process state (environment variables,
//! secret stores) from inside forecasting logic. The invoking layer is
//! responsible for assembling a [`RunConfig`] from whatever sources it
//! trusts and handing it over whole.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default forecast horizon: one week of hourly steps.
pub const DEFAULT_HORIZON_HOURS: u32 = 168;

/// Default minimum history a region needs before it may be forecast:
/// two weeks of hourly observations.
pub const DEFAULT_MIN_HISTORY_HOURS: u32 = 336;

/// Hard ceiling on the horizon: one year of hourly steps.
pub const MAX_HORIZON_HOURS: u32 = 8_760;

/// Smallest admissible minimum-history threshold. Below two days the
/// seasonal buckets are mostly empty and the trend fit is meaningless.
pub const MIN_HISTORY_FLOOR_HOURS: u32 = 48;

/// Errors from run configuration construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required builder field was not supplied.
    #[error("Missing configuration parameter: {0}")]
    MissingParameter(&'static str),

    /// Horizon outside `[1, MAX_HORIZON_HOURS]`.
    #[error("Invalid horizon: {0} hours (must be in [1, {MAX_HORIZON_HOURS}])")]
    InvalidHorizon(u32),

    /// Minimum-history threshold below the floor.
    #[error(
        "Invalid minimum history: {0} hours (must be at least {MIN_HISTORY_FLOOR_HOURS})"
    )]
    InvalidMinHistory(u32),

    /// Comfort band bounds are not an ordered, finite pair.
    #[error("Invalid comfort band: [{low}, {high}] (need finite low < high)")]
    InvalidComfortBand {
        /// Lower bound supplied.
        low: f64,
        /// Upper bound supplied.
        high: f64,
    },

    /// A shock parameter is out of range.
    #[error("Invalid shock parameter {name}: {value}")]
    InvalidShockParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Temperature comfort band in degrees Celsius.
///
/// Hours whose climatological temperature falls inside the band carry
/// no weather-driven volatility; deviation beyond either bound scales
/// the shock multiplier linearly.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComfortBand {
    /// Lower bound (°C).
    pub low_c: f64,
    /// Upper bound (°C).
    pub high_c: f64,
}

impl Default for ComfortBand {
    fn default() -> Self {
        Self {
            low_c: 18.0,
            high_c: 24.0,
        }
    }
}

impl ComfortBand {
    /// Degrees by which `temp_c` lies outside the band (0 inside it).
    #[inline]
    pub fn deviation(&self, temp_c: f64) -> f64 {
        if temp_c < self.low_c {
            self.low_c - temp_c
        } else if temp_c > self.high_c {
            temp_c - self.high_c
        } else {
            0.0
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.low_c.is_finite() || !self.high_c.is_finite() || self.low_c >= self.high_c {
            return Err(ConfigError::InvalidComfortBand {
                low: self.low_c,
                high: self.high_c,
            });
        }
        Ok(())
    }
}

/// Parameters of the stochastic shock applied on top of the baseline.
///
/// The defaults reproduce the documented stress scenario: prices
/// uplifted ~30% with 10% noise, demand uplifted ~15% with 5% noise,
/// extra spikes during peak hours, and volatility growing by
/// `temperature_sensitivity` per degree of comfort-band deviation up to
/// `max_multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShockParams {
    /// Mean multiplicative uplift applied to baseline price.
    pub price_uplift: f64,
    /// Price noise scale before volatility multiplication.
    pub price_sigma: f64,
    /// Mean multiplicative uplift applied to baseline demand.
    pub demand_uplift: f64,
    /// Demand noise scale before volatility multiplication.
    pub demand_sigma: f64,
    /// Volatility multiplier when weather carries no signal.
    pub base_multiplier: f64,
    /// Multiplier growth per degree Celsius outside the comfort band.
    pub temperature_sensitivity: f64,
    /// Ceiling on the volatility multiplier.
    pub max_multiplier: f64,
    /// Additive multiplier uplift during peak hours (07–09, 17–21).
    pub peak_uplift: f64,
}

impl Default for ShockParams {
    fn default() -> Self {
        Self {
            price_uplift: 1.3,
            price_sigma: 0.1,
            demand_uplift: 1.15,
            demand_sigma: 0.05,
            base_multiplier: 1.0,
            temperature_sensitivity: 0.05,
            max_multiplier: 3.0,
            peak_uplift: 0.5,
        }
    }
}

impl ShockParams {
    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("price_sigma", self.price_sigma),
            ("demand_sigma", self.demand_sigma),
            ("temperature_sensitivity", self.temperature_sensitivity),
            ("peak_uplift", self.peak_uplift),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidShockParameter { name, value });
            }
        }
        let finite = [
            ("price_uplift", self.price_uplift),
            ("demand_uplift", self.demand_uplift),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::InvalidShockParameter { name, value });
            }
        }
        if !self.base_multiplier.is_finite() || self.base_multiplier <= 0.0 {
            return Err(ConfigError::InvalidShockParameter {
                name: "base_multiplier",
                value: self.base_multiplier,
            });
        }
        if !self.max_multiplier.is_finite() || self.max_multiplier < self.base_multiplier {
            return Err(ConfigError::InvalidShockParameter {
                name: "max_multiplier",
                value: self.max_multiplier,
            });
        }
        Ok(())
    }
}

/// Immutable configuration for one forecasting run.
///
/// Use [`RunConfig::builder`] to construct instances; the builder
/// validates every field at build time.
///
/// # Examples
///
/// ```rust
/// use forecast_core::config::RunConfig;
///
/// let config = RunConfig::builder()
///     .input_path("fact_energy_market.csv")
///     .output_dir("data")
///     .seed(42)
///     .horizon_hours(24)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.seed(), 42);
/// assert_eq!(config.horizon_hours(), 24);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    input_path: PathBuf,
    output_dir: PathBuf,
    seed: u64,
    horizon_hours: u32,
    min_history_hours: u32,
    shock: ShockParams,
    comfort_band: ComfortBand,
}

impl RunConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Path of the historical market dataset to load.
    #[inline]
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Directory the three forecast tables are written into.
    #[inline]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Master seed for the shock simulation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of hourly steps to forecast.
    #[inline]
    pub fn horizon_hours(&self) -> u32 {
        self.horizon_hours
    }

    /// Minimum hourly observations a region needs to be forecast.
    #[inline]
    pub fn min_history_hours(&self) -> u32 {
        self.min_history_hours
    }

    /// Shock simulation parameters.
    #[inline]
    pub fn shock(&self) -> &ShockParams {
        &self.shock
    }

    /// Temperature comfort band.
    #[inline]
    pub fn comfort_band(&self) -> &ComfortBand {
        &self.comfort_band
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_parameters(
            self.horizon_hours,
            self.min_history_hours,
            &self.shock,
            &self.comfort_band,
        )
    }
}

fn validate_parameters(
    horizon_hours: u32,
    min_history_hours: u32,
    shock: &ShockParams,
    comfort_band: &ComfortBand,
) -> Result<(), ConfigError> {
    if horizon_hours == 0 || horizon_hours > MAX_HORIZON_HOURS {
        return Err(ConfigError::InvalidHorizon(horizon_hours));
    }
    if min_history_hours < MIN_HISTORY_FLOOR_HOURS {
        return Err(ConfigError::InvalidMinHistory(min_history_hours));
    }
    comfort_band.validate()?;
    shock.validate()?;
    Ok(())
}

/// Builder for [`RunConfig`].
///
/// `input_path` and `output_dir` are required; everything else defaults
/// to the documented operational values.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    seed: u64,
    horizon_hours: Option<u32>,
    min_history_hours: Option<u32>,
    shock: Option<ShockParams>,
    comfort_band: Option<ComfortBand>,
}

impl RunConfigBuilder {
    /// Sets the input dataset path.
    #[inline]
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Sets the output directory.
    #[inline]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the master seed (default 0).
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the horizon length in hours (default 168).
    #[inline]
    pub fn horizon_hours(mut self, hours: u32) -> Self {
        self.horizon_hours = Some(hours);
        self
    }

    /// Sets the minimum-history threshold in hours (default 336).
    #[inline]
    pub fn min_history_hours(mut self, hours: u32) -> Self {
        self.min_history_hours = Some(hours);
        self
    }

    /// Sets the shock parameters (default [`ShockParams::default`]).
    #[inline]
    pub fn shock(mut self, shock: ShockParams) -> Self {
        self.shock = Some(shock);
        self
    }

    /// Sets the comfort band (default 18–24 °C).
    #[inline]
    pub fn comfort_band(mut self, band: ComfortBand) -> Self {
        self.comfort_band = Some(band);
        self
    }

    /// Validates the numeric parameters set so far, without requiring
    /// `input_path` or `output_dir`.
    ///
    /// Unset parameters are checked at their defaults, so this vets a
    /// configuration overlay before any dataset path is known.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is out of range.
    pub fn check_parameters(&self) -> Result<(), ConfigError> {
        validate_parameters(
            self.horizon_hours.unwrap_or(DEFAULT_HORIZON_HOURS),
            self.min_history_hours.unwrap_or(DEFAULT_MIN_HISTORY_HOURS),
            &self.shock.unwrap_or_default(),
            &self.comfort_band.unwrap_or_default(),
        )
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required field is missing or any
    /// parameter is out of range.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let input_path = self
            .input_path
            .ok_or(ConfigError::MissingParameter("input_path"))?;
        let output_dir = self
            .output_dir
            .ok_or(ConfigError::MissingParameter("output_dir"))?;

        let config = RunConfig {
            input_path,
            output_dir,
            seed: self.seed,
            horizon_hours: self.horizon_hours.unwrap_or(DEFAULT_HORIZON_HOURS),
            min_history_hours: self.min_history_hours.unwrap_or(DEFAULT_MIN_HISTORY_HOURS),
            shock: self.shock.unwrap_or_default(),
            comfort_band: self.comfort_band.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RunConfigBuilder {
        RunConfig::builder().input_path("in.csv").output_dir("out")
    }

    #[test]
    fn test_defaults() {
        let config = builder().build().unwrap();
        assert_eq!(config.horizon_hours(), DEFAULT_HORIZON_HOURS);
        assert_eq!(config.min_history_hours(), DEFAULT_MIN_HISTORY_HOURS);
        assert_eq!(config.seed(), 0);
        assert_eq!(config.shock(), &ShockParams::default());
        assert_eq!(config.comfort_band(), &ComfortBand::default());
    }

    #[test]
    fn test_missing_input_path() {
        let result = RunConfig::builder().output_dir("out").build();
        assert_eq!(result, Err(ConfigError::MissingParameter("input_path")));
    }

    #[test]
    fn test_missing_output_dir() {
        let result = RunConfig::builder().input_path("in.csv").build();
        assert_eq!(result, Err(ConfigError::MissingParameter("output_dir")));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = builder().horizon_hours(0).build();
        assert_eq!(result, Err(ConfigError::InvalidHorizon(0)));
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let result = builder().horizon_hours(MAX_HORIZON_HOURS + 1).build();
        assert!(matches!(result, Err(ConfigError::InvalidHorizon(_))));
    }

    #[test]
    fn test_min_history_floor() {
        let result = builder().min_history_hours(24).build();
        assert_eq!(result, Err(ConfigError::InvalidMinHistory(24)));
        assert!(builder()
            .min_history_hours(MIN_HISTORY_FLOOR_HOURS)
            .build()
            .is_ok());
    }

    #[test]
    fn test_inverted_comfort_band_rejected() {
        let band = ComfortBand {
            low_c: 25.0,
            high_c: 18.0,
        };
        let result = builder().comfort_band(band).build();
        assert!(matches!(result, Err(ConfigError::InvalidComfortBand { .. })));
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let shock = ShockParams {
            price_sigma: -0.1,
            ..ShockParams::default()
        };
        let result = builder().shock(shock).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidShockParameter {
                name: "price_sigma",
                ..
            })
        ));
    }

    #[test]
    fn test_multiplier_cap_below_base_rejected() {
        let shock = ShockParams {
            base_multiplier: 2.0,
            max_multiplier: 1.5,
            ..ShockParams::default()
        };
        let result = builder().shock(shock).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidShockParameter {
                name: "max_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn test_check_parameters_needs_no_paths() {
        assert!(RunConfig::builder().check_parameters().is_ok());
        let result = RunConfig::builder().horizon_hours(0).check_parameters();
        assert_eq!(result, Err(ConfigError::InvalidHorizon(0)));
        let shock = ShockParams {
            demand_sigma: f64::NAN,
            ..ShockParams::default()
        };
        let result = RunConfig::builder().shock(shock).check_parameters();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidShockParameter {
                name: "demand_sigma",
                ..
            })
        ));
    }

    #[test]
    fn test_comfort_band_deviation() {
        let band = ComfortBand::default();
        assert_eq!(band.deviation(21.0), 0.0);
        assert_eq!(band.deviation(30.0), 6.0);
        assert_eq!(band.deviation(10.0), 8.0);
    }
}
