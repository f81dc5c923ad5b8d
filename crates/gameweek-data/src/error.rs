//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading and validating the statistics file.
#[derive(Debug, Error)]
pub enum DataError {
    /// Required columns are absent from the input table
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Every missing column, in schema order
        columns: Vec<String>,
    },

    /// A required cell is empty
    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue {
        /// Column holding the empty cell
        column: String,
        /// Zero-based row index in file order
        row: usize,
    },

    /// A numeric column holds a value that cannot be read as a number
    #[error("Column '{column}' is not numeric: {reason}")]
    NonNumeric {
        /// Offending column
        column: String,
        /// Underlying cast failure
        reason: String,
    },

    /// The schema itself is inconsistent
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
