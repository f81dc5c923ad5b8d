//! Error types for feature preparation.

use thiserror::Error;

/// Errors raised by a [`TextEncoder`](crate::TextEncoder).
#[derive(Debug, Error)]
pub enum EncoderError {
    /// Vocabulary could not be read
    #[error("Failed to read vocabulary: {0}")]
    Io(#[from] std::io::Error),

    /// Vocabulary has no entries
    #[error("Vocabulary is empty")]
    EmptyVocabulary,

    /// A framing or padding token is absent from the vocabulary
    #[error("Vocabulary is missing special token {0}")]
    MissingSpecialToken(String),

    /// Requested sequence length cannot hold the framing tokens
    #[error("Maximum length {max_length} is too small, need at least {required}")]
    MaxLengthTooSmall {
        /// Requested maximum length
        max_length: usize,
        /// Smallest usable length
        required: usize,
    },
}

/// Errors raised while building the numeric feature matrix.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Nothing to scale
    #[error("Feature matrix is empty")]
    Empty,

    /// NaN or infinite input
    #[error("Non-finite value in column '{column}' at row {row}")]
    NonFinite {
        /// Feature column
        column: String,
        /// Row in the deduplicated dataset
        row: usize,
    },

    /// Constant column with the rejecting policy
    #[error("Column '{column}' has zero variance and cannot be standardized")]
    DegenerateColumn {
        /// Feature column
        column: String,
    },

    /// Matrix width does not match the fitted scaler
    #[error("Dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch {
        /// Fitted width
        expected: usize,
        /// Width of the matrix passed in
        actual: usize,
    },
}
