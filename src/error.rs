//! Error types for loading data, configuring and running the experiment.
//!
//! Every failure is fatal to the run: malformed rows are reported, never skipped.

use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or running an experiment.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a dataset or config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `ExperimentConfig`.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config values outside their allowed range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// A dataset line could not be parsed.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A dataset line has the wrong number of features.
    #[error("line {line}: expected {expected} features, found {found}")]
    FeatureCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Buffers handed to a dataset or model disagree on shape.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Requested train split is larger than the dataset.
    #[error("train split of {train_size} samples requested from a dataset of {available}")]
    SplitTooLarge { train_size: usize, available: usize },

    /// Training or evaluation was handed a dataset with no samples.
    #[error("dataset is empty")]
    EmptyDataset,
}

impl Error {
    /// Create a new invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a new parse error for a 1-based line number.
    #[must_use]
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}
