//! Top-level engine error.

use thiserror::Error;

use crate::baseline::EstimatorError;
use crate::delta::DeltaError;
use crate::validate::ValidationError;
use crate::writer::WriteError;
use adapter_loader::LoadError;

/// Aggregate error for one forecasting run.
///
/// Load and estimator failures abort the run immediately; validation
/// failures carry the full accumulated list of violated invariants.
/// Nothing in the engine is retried — the run as a whole is the unit of
/// retry and belongs to the external scheduler.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Dataset loading or schema validation failed.
    #[error("Dataset load failed: {0}")]
    Load(#[from] LoadError),

    /// Baseline estimation failed.
    #[error("Baseline estimation failed: {0}")]
    Estimator(#[from] EstimatorError),

    /// Delta computation failed.
    #[error("Delta computation failed: {0}")]
    Delta(#[from] DeltaError),

    /// One or more output invariants were violated before publishing.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Writing the forecast tables failed.
    #[error("Table write failed: {0}")]
    Write(#[from] WriteError),
}
