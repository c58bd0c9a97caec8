//! Error types for dataset loading.

use chrono::{DateTime, Utc};
use forecast_core::types::Region;
use thiserror::Error;

/// Errors from loading and validating the market dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The input file could not be opened or read.
    #[error("Failed to open dataset {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed at the transport level (malformed quoting,
    /// ragged rows and similar).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing or a cell failed typed conversion.
    #[error("Schema error in column '{column}': {detail}")]
    Schema {
        /// Column the violation belongs to.
        column: String,
        /// Human-readable description, including the row number where
        /// applicable.
        detail: String,
    },

    /// The file parsed cleanly but holds zero data rows.
    #[error("Dataset contains no rows")]
    EmptyDataset,

    /// Two rows share the same `(timestamp, region)` key.
    #[error("Duplicate key: region {region} at {timestamp}")]
    DuplicateKey {
        /// Region of the duplicated key.
        region: Region,
        /// Timestamp of the duplicated key.
        timestamp: DateTime<Utc>,
    },
}

impl LoadError {
    pub(crate) fn schema(column: &str, detail: impl Into<String>) -> Self {
        Self::Schema {
            column: column.to_string(),
            detail: detail.into(),
        }
    }
}
