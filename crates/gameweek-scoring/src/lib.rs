#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod invoker;
pub mod linear;

pub use invoker::{Scores, invoke};
pub use linear::{LinearModelArtifact, LinearScoringModel};

use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors that can occur while loading or invoking a scoring model
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Model artifact could not be loaded
    #[error("Failed to load model from {path}: {reason}")]
    Load {
        /// Artifact path
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Input shape disagrees with what the model expects
    #[error("Shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which dimension disagreed
        what: String,
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Token batch and feature matrix describe different players
    #[error("Token and feature rows are misaligned at row {row}: {token_key} vs {feature_key}")]
    Misaligned {
        /// First disagreeing row
        row: usize,
        /// Identifier on the token side
        token_key: String,
        /// Identifier on the feature side
        feature_key: String,
    },

    /// Model failed during inference
    #[error("Model inference failed: {0}")]
    Inference(String),
}

/// Two-part model input: token representation and standardized features.
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    /// Token ids, `rows x sequence_length`
    pub ids: &'a Array2<u32>,
    /// Attention mask, `rows x sequence_length`
    pub mask: &'a Array2<u8>,
    /// Standardized numeric features, `rows x features`
    pub features: &'a Array2<f64>,
}

impl ModelInput<'_> {
    /// Number of rows in the batch.
    pub fn rows(&self) -> usize {
        self.features.nrows()
    }
}

/// Trait for pretrained scoring models
pub trait ScoringModel {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Score every row of the batch.
    ///
    /// # Returns
    /// * One raw score per input row, in input order
    fn score(&self, input: &ModelInput<'_>) -> Result<Array1<f64>, ScoringError>;
}

impl<T: ScoringModel + ?Sized> ScoringModel for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, input: &ModelInput<'_>) -> Result<Array1<f64>, ScoringError> {
        (**self).score(input)
    }
}
