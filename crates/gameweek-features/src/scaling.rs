//! Numeric-feature normalization.
//!
//! Per-column standardization `(x - mean) / std` with the population
//! standard deviation, fitted on the batch being scored. No fit is persisted
//! between runs.

use crate::error::FeatureError;
use gameweek_data::{Dataset, PlayerId};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard deviation below which a column counts as constant.
const STD_EPSILON: f64 = 1e-12;

/// What to do with a column whose values are all equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroVariancePolicy {
    /// Subtract the mean and leave the column unscaled (all zeros)
    #[default]
    Center,
    /// Fail the run
    Reject,
}

/// Fitted per-column mean and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
    zero_variance: Vec<usize>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    ///
    /// Constant columns get a scale of 1 and are reported by
    /// [`zero_variance_columns`](Self::zero_variance_columns).
    ///
    /// # Errors
    /// Returns [`FeatureError::Empty`] for a matrix without rows or columns.
    pub fn fit(data: &Array2<f64>) -> Result<Self, FeatureError> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(FeatureError::Empty);
        }
        let mean = data.mean_axis(Axis(0)).ok_or(FeatureError::Empty)?;
        let std = data.std_axis(Axis(0), 0.0);

        let zero_variance: Vec<usize> = std
            .iter()
            .enumerate()
            .filter(|(_, s)| **s < STD_EPSILON)
            .map(|(i, _)| i)
            .collect();
        let scale = std.mapv(|s| if s < STD_EPSILON { 1.0 } else { s });

        Ok(Self {
            mean,
            scale,
            zero_variance,
        })
    }

    /// Standardize `data` in place.
    ///
    /// # Errors
    /// Returns [`FeatureError::DimensionMismatch`] if the width differs from
    /// the fitted width.
    pub fn transform(&self, data: &mut Array2<f64>) -> Result<(), FeatureError> {
        if data.ncols() != self.mean.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: self.mean.len(),
                actual: data.ncols(),
            });
        }
        *data -= &self.mean;
        *data /= &self.scale;
        Ok(())
    }

    /// Fit on `data`, then standardize it in place.
    ///
    /// # Errors
    /// See [`fit`](Self::fit).
    pub fn fit_transform(data: &mut Array2<f64>) -> Result<Self, FeatureError> {
        let scaler = Self::fit(data)?;
        scaler.transform(data)?;
        Ok(scaler)
    }

    /// Fitted column means.
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Fitted column scales (1 for constant columns).
    pub const fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Indices of constant columns.
    pub fn zero_variance_columns(&self) -> &[usize] {
        &self.zero_variance
    }
}

/// Standardized numeric features, one row per unique identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Identifier of each row
    pub keys: Vec<PlayerId>,
    /// Column names in matrix order
    pub columns: Vec<String>,
    /// Values, `rows x columns`
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Deduplicates a dataset and standardizes its numeric features.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: ZeroVariancePolicy,
}

impl Normalizer {
    /// Create a normalizer with the given constant-column policy.
    pub const fn new(policy: ZeroVariancePolicy) -> Self {
        Self { policy }
    }

    /// Raw numeric matrix of the first record per identifier.
    ///
    /// # Errors
    /// Returns [`FeatureError::NonFinite`] on NaN or infinite values.
    pub fn extract(dataset: &Dataset) -> Result<FeatureMatrix, FeatureError> {
        let unique = dataset.deduplicate();
        let columns = unique.schema().numeric_features.clone();
        let mut values = Array2::<f64>::zeros((unique.len(), columns.len()));
        for (row, record) in unique.records().iter().enumerate() {
            for (col, &value) in record.numeric.iter().enumerate() {
                if !value.is_finite() {
                    return Err(FeatureError::NonFinite {
                        column: columns[col].clone(),
                        row,
                    });
                }
                values[[row, col]] = value;
            }
        }
        Ok(FeatureMatrix {
            keys: unique.records().iter().map(|r| r.id.clone()).collect(),
            columns,
            values,
        })
    }

    /// Extract and standardize, applying the zero-variance policy.
    ///
    /// # Errors
    /// Returns an error for empty input, non-finite values, or a constant
    /// column under [`ZeroVariancePolicy::Reject`].
    pub fn normalize(
        &self,
        dataset: &Dataset,
    ) -> Result<(FeatureMatrix, StandardScaler), FeatureError> {
        let mut matrix = Self::extract(dataset)?;
        let scaler = StandardScaler::fit(&matrix.values)?;

        for &col in scaler.zero_variance_columns() {
            let column = &matrix.columns[col];
            match self.policy {
                ZeroVariancePolicy::Center => {
                    log::warn!("Column '{column}' has zero variance; centering without scaling");
                }
                ZeroVariancePolicy::Reject => {
                    return Err(FeatureError::DegenerateColumn {
                        column: column.clone(),
                    });
                }
            }
        }

        scaler.transform(&mut matrix.values)?;
        log::info!(
            "Standardized {} rows x {} numeric features",
            matrix.values.nrows(),
            matrix.values.ncols()
        );
        Ok((matrix, scaler))
    }
}
