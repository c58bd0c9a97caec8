//! CLI error type and result alias.

use thiserror::Error;

use adapter_loader::LoadError;
use forecast_core::config::ConfigError;
use forecast_engine::EngineError;

/// Result alias used throughout the CLI.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the operator by the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    /// A path supplied on the command line does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The configuration file could not be parsed.
    #[error("Could not parse configuration file {path}: {source}")]
    ConfigParse {
        /// Configuration file path.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// Run configuration failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dataset validation failed (dry-run mode).
    #[error("Dataset validation failed: {0}")]
    Load(#[from] LoadError),

    /// The forecasting run itself failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Filesystem error outside the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
