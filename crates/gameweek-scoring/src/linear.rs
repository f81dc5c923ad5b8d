//! Linear scoring head stored as a JSON artifact.
//!
//! score = bias + Σ wᵢ·xᵢ + mask_weight · (attended tokens / sequence_length)

use crate::{ModelInput, ScoringError, ScoringModel};
use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk form of a [`LinearScoringModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    /// Model name
    pub name: String,
    /// Token sequence length the model accepts
    pub sequence_length: usize,
    /// One weight per standardized feature, in feature order
    pub feature_weights: Vec<f64>,
    /// Weight on the attended-token fraction
    #[serde(default)]
    pub mask_weight: f64,
    /// Intercept
    #[serde(default)]
    pub bias: f64,
}

/// Linear model over the standardized features and token coverage
#[derive(Debug, Clone)]
pub struct LinearScoringModel {
    artifact: LinearModelArtifact,
    weights: Array1<f64>,
}

impl LinearScoringModel {
    /// Create from an artifact.
    ///
    /// # Errors
    /// Returns [`ScoringError::Load`] if the sequence length is zero or there
    /// are no feature weights.
    pub fn new(artifact: LinearModelArtifact) -> Result<Self, ScoringError> {
        if artifact.sequence_length == 0 || artifact.feature_weights.is_empty() {
            return Err(ScoringError::Load {
                path: artifact.name.clone(),
                reason: "artifact needs a positive sequence length and feature weights"
                    .to_string(),
            });
        }
        let weights = Array1::from(artifact.feature_weights.clone());
        Ok(Self { artifact, weights })
    }

    /// Load a JSON artifact from disk.
    ///
    /// # Errors
    /// Returns [`ScoringError::Load`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        let load_err = |reason: String| ScoringError::Load {
            path: path.display().to_string(),
            reason,
        };
        let contents = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let artifact: LinearModelArtifact =
            serde_json::from_str(&contents).map_err(|e| load_err(e.to_string()))?;
        let model = Self::new(artifact)?;
        log::info!(
            "Loaded model '{}' ({} features, {} tokens) from {}",
            model.artifact.name,
            model.artifact.feature_weights.len(),
            model.artifact.sequence_length,
            path.display()
        );
        Ok(model)
    }

    /// Artifact the model was built from.
    pub const fn artifact(&self) -> &LinearModelArtifact {
        &self.artifact
    }

    fn check_shape(&self, input: &ModelInput<'_>) -> Result<(), ScoringError> {
        let checks = [
            (
                "sequence length of token ids",
                self.artifact.sequence_length,
                input.ids.ncols(),
            ),
            (
                "sequence length of attention mask",
                self.artifact.sequence_length,
                input.mask.ncols(),
            ),
            ("feature count", self.weights.len(), input.features.ncols()),
            ("token rows", input.rows(), input.ids.nrows()),
            ("mask rows", input.rows(), input.mask.nrows()),
        ];
        for (what, expected, actual) in checks {
            if expected != actual {
                return Err(ScoringError::ShapeMismatch {
                    what: what.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl ScoringModel for LinearScoringModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn score(&self, input: &ModelInput<'_>) -> Result<Array1<f64>, ScoringError> {
        self.check_shape(input)?;

        let coverage = input
            .mask
            .mapv(f64::from)
            .sum_axis(Axis(1))
            .mapv(|attended| attended / self.artifact.sequence_length as f64);

        Ok(input.features.dot(&self.weights)
            + coverage * self.artifact.mask_weight
            + self.artifact.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};
    use rstest::rstest;

    fn model() -> LinearScoringModel {
        LinearScoringModel::new(LinearModelArtifact {
            name: "test".to_string(),
            sequence_length: 4,
            feature_weights: vec![2.0, -1.0],
            mask_weight: 4.0,
            bias: 0.5,
        })
        .unwrap()
    }

    #[test]
    fn test_linear_score() {
        let ids = Array2::<u32>::zeros((2, 4));
        let mask = array![[1u8, 1, 0, 0], [1, 1, 1, 1]];
        let features = array![[1.0, 1.0], [0.0, 2.0]];
        let scores = model()
            .score(&ModelInput {
                ids: &ids,
                mask: &mask,
                features: &features,
            })
            .unwrap();
        // 2 - 1 + 4 * 0.5 + 0.5, -2 + 4 * 1 + 0.5
        assert_relative_eq!(scores[0], 3.5);
        assert_relative_eq!(scores[1], 2.5);
    }

    #[rstest]
    #[case([0, 0, 0, 0], 0.0)]
    #[case([1, 0, 0, 0], 1.0)]
    #[case([1, 1, 1, 0], 3.0)]
    #[case([1, 1, 1, 1], 4.0)]
    fn test_mask_coverage(#[case] mask: [u8; 4], #[case] expected: f64) {
        let model = LinearScoringModel::new(LinearModelArtifact {
            name: "coverage".to_string(),
            sequence_length: 4,
            feature_weights: vec![0.0],
            mask_weight: 4.0,
            bias: 0.0,
        })
        .unwrap();
        let ids = Array2::<u32>::zeros((1, 4));
        let mask = Array2::from_shape_vec((1, 4), mask.to_vec()).unwrap();
        let features = array![[7.0]];
        let scores = model
            .score(&ModelInput {
                ids: &ids,
                mask: &mask,
                features: &features,
            })
            .unwrap();
        assert_relative_eq!(scores[0], expected);
    }

    #[test]
    fn test_sequence_length_mismatch() {
        let ids = Array2::<u32>::zeros((1, 3));
        let mask = Array2::<u8>::zeros((1, 3));
        let features = array![[1.0, 1.0]];
        let err = model()
            .score(&ModelInput {
                ids: &ids,
                mask: &mask,
                features: &features,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ScoringError::ShapeMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let ids = Array2::<u32>::zeros((1, 4));
        let mask = Array2::<u8>::zeros((1, 4));
        let features = array![[1.0, 1.0, 1.0]];
        let err = model()
            .score(&ModelInput {
                ids: &ids,
                mask: &mask,
                features: &features,
            })
            .unwrap_err();
        assert!(matches!(err, ScoringError::ShapeMismatch { ref what, .. } if what == "feature count"));
    }

    #[test]
    fn test_rejects_empty_artifact() {
        let artifact = LinearModelArtifact {
            name: "empty".to_string(),
            sequence_length: 128,
            feature_weights: vec![],
            mask_weight: 0.0,
            bias: 0.0,
        };
        assert!(matches!(
            LinearScoringModel::new(artifact),
            Err(ScoringError::Load { .. })
        ));
    }

    #[test]
    fn test_load_malformed_json() {
        let path = std::env::temp_dir().join("gameweek_scoring_malformed.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            LinearScoringModel::load(&path),
            Err(ScoringError::Load { .. })
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("gameweek_scoring_missing.json");
        assert!(LinearScoringModel::load(&path).is_err());
    }
}
