//! Error types for post-processing, evaluation and export.

use thiserror::Error;

/// Errors that can occur while post-processing or evaluating scores.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A score refers to a player absent from the dataset
    #[error("No record for identifier {0}")]
    UnknownIdentifier(String),

    /// NaN or infinite raw score
    #[error("Non-finite score {value} for identifier {id}")]
    NonFiniteScore {
        /// Player the score belongs to
        id: String,
        /// Offending value
        value: f64,
    },

    /// Ground truth and predictions have different lengths
    #[error("Length mismatch: {truth} ground-truth values vs {predicted} predictions")]
    LengthMismatch {
        /// Number of ground-truth values
        truth: usize,
        /// Number of predictions
        predicted: usize,
    },

    /// Nothing to evaluate
    #[error("Cannot evaluate an empty set of predictions")]
    Empty,
}

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
