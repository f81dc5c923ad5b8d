//! Single-pass model invocation.

use crate::{ModelInput, ScoringError, ScoringModel};
use gameweek_data::PlayerId;
use gameweek_features::{FeatureMatrix, TokenBatch};
use std::collections::HashMap;

/// Raw model output keyed by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    /// Identifier of each score
    pub keys: Vec<PlayerId>,
    /// Raw scores, aligned with `keys`
    pub values: Vec<f64>,
}

impl Scores {
    /// Pair keys with values.
    ///
    /// # Errors
    /// Returns [`ScoringError::ShapeMismatch`] if the lengths differ.
    pub fn new(keys: Vec<PlayerId>, values: Vec<f64>) -> Result<Self, ScoringError> {
        if keys.len() != values.len() {
            return Err(ScoringError::ShapeMismatch {
                what: "score count".to_string(),
                expected: keys.len(),
                actual: values.len(),
            });
        }
        Ok(Self { keys, values })
    }

    /// Number of scores.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no scores.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate `(identifier, raw score)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, f64)> + '_ {
        self.keys.iter().zip(self.values.iter().copied())
    }

    /// Score lookup by identifier.
    pub fn by_id(&self) -> HashMap<&PlayerId, f64> {
        self.iter().collect()
    }
}

fn check_alignment(tokens: &TokenBatch, features: &FeatureMatrix) -> Result<(), ScoringError> {
    if tokens.len() != features.len() {
        return Err(ScoringError::ShapeMismatch {
            what: "token rows vs feature rows".to_string(),
            expected: features.len(),
            actual: tokens.len(),
        });
    }
    if let Some((row, (token_key, feature_key))) = tokens
        .keys
        .iter()
        .zip(&features.keys)
        .enumerate()
        .find(|(_, (t, f))| t != f)
    {
        return Err(ScoringError::Misaligned {
            row,
            token_key: token_key.to_string(),
            feature_key: feature_key.to_string(),
        });
    }
    Ok(())
}

/// Score a whole batch with one model call.
///
/// The token batch and feature matrix must carry the same identifiers in
/// the same order; the model must return one score per row.
///
/// # Errors
/// Returns [`ScoringError::Misaligned`] or [`ScoringError::ShapeMismatch`]
/// on disagreeing inputs or output, [`ScoringError::Inference`] if a score
/// is NaN or infinite, and propagates model failures.
pub fn invoke(
    model: &dyn ScoringModel,
    tokens: &TokenBatch,
    features: &FeatureMatrix,
) -> Result<Scores, ScoringError> {
    check_alignment(tokens, features)?;

    let input = ModelInput {
        ids: &tokens.ids,
        mask: &tokens.mask,
        features: &features.values,
    };
    let raw = model.score(&input)?;
    if raw.len() != input.rows() {
        return Err(ScoringError::ShapeMismatch {
            what: "model output rows".to_string(),
            expected: input.rows(),
            actual: raw.len(),
        });
    }
    if let Some((row, value)) = raw.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ScoringError::Inference(format!(
            "model '{}' returned {value} for {}",
            model.name(),
            features.keys[row]
        )));
    }
    log::info!("Model '{}' scored {} rows", model.name(), raw.len());

    Scores::new(features.keys.clone(), raw.to_vec())
}
