//! Error metrics of raw scores against ground truth.

use crate::error::OutputError;
use gameweek_data::Dataset;
use gameweek_scoring::Scores;
use serde::{Deserialize, Serialize};

/// One side-by-side row of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Ground-truth points, truncated toward zero
    #[serde(rename = "Real Value")]
    pub real_value: i64,
    /// Raw model score
    #[serde(rename = "Predicted Value")]
    pub predicted_value: f64,
}

/// Evaluation metrics plus the rows they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Comparison rows in caller order
    pub rows: Vec<Comparison>,
}

impl Evaluation {
    /// Number of compared pairs.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing was compared.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Compute MSE and RMSE of `predicted` against `truth`.
///
/// # Errors
/// Returns [`OutputError::LengthMismatch`] if the slices differ in length and
/// [`OutputError::Empty`] if they are empty.
pub fn evaluate(truth: &[i64], predicted: &[f64]) -> Result<Evaluation, OutputError> {
    if truth.len() != predicted.len() {
        return Err(OutputError::LengthMismatch {
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(OutputError::Empty);
    }

    let mse = truth
        .iter()
        .zip(predicted)
        .map(|(&t, p)| (t as f64 - p).powi(2))
        .sum::<f64>()
        / truth.len() as f64;
    let rmse = mse.sqrt();

    let rows = truth
        .iter()
        .zip(predicted)
        .map(|(&real_value, &predicted_value)| Comparison {
            real_value,
            predicted_value,
        })
        .collect();

    log::info!("Evaluation over {} rows: MSE {mse:.4}, RMSE {rmse:.4}", truth.len());
    Ok(Evaluation { mse, rmse, rows })
}

/// Pair every input record with the raw score of its identifier.
///
/// Duplicated identifiers contribute one pair per record. Ground truth is the
/// record's label truncated toward zero.
///
/// # Returns
/// * `(truth, predicted)` in record order
///
/// # Errors
/// Returns [`OutputError::UnknownIdentifier`] if a record has no score.
pub fn align_truth(dataset: &Dataset, scores: &Scores) -> Result<(Vec<i64>, Vec<f64>), OutputError> {
    let by_id = scores.by_id();
    dataset
        .records()
        .iter()
        .map(|record| -> Result<(i64, f64), OutputError> {
            let score = by_id
                .get(&record.id)
                .copied()
                .ok_or_else(|| OutputError::UnknownIdentifier(record.id.to_string()))?;
            Ok((record.label.trunc() as i64, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gameweek_data::{FeatureSchema, PlayerId, Record};

    #[test]
    fn test_evaluate_raw_scores() {
        let eval = evaluate(&[1, 3, 4], &[1.4, -2.6, 3.5]).unwrap();
        // (0.16 + 31.36 + 0.25) / 3
        assert_relative_eq!(eval.mse, 31.77 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(eval.rmse, (31.77_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(eval.len(), 3);
        assert_eq!(
            eval.rows[1],
            Comparison {
                real_value: 3,
                predicted_value: -2.6
            }
        );
    }

    #[test]
    fn test_evaluate_perfect() {
        let eval = evaluate(&[2, 5], &[2.0, 5.0]).unwrap();
        assert_relative_eq!(eval.mse, 0.0);
        assert_relative_eq!(eval.rmse, 0.0);
    }

    #[test]
    fn test_evaluate_length_mismatch() {
        assert!(matches!(
            evaluate(&[1, 2], &[1.0]),
            Err(OutputError::LengthMismatch {
                truth: 2,
                predicted: 1
            })
        ));
    }

    #[test]
    fn test_evaluate_empty() {
        assert!(matches!(evaluate(&[], &[]), Err(OutputError::Empty)));
    }

    #[test]
    fn test_align_truth_keeps_duplicates() {
        let schema = FeatureSchema {
            numeric_features: vec!["Mixed".into()],
            text_columns: vec![],
            ..FeatureSchema::default()
        };
        let record = |id: i64, label: f64| Record {
            id: PlayerId::from(id),
            category: "1".into(),
            period: "1".into(),
            numeric: vec![label],
            text: vec![],
            label,
        };
        let dataset =
            Dataset::from_records(schema, vec![record(7, 2.9), record(8, -1.5), record(7, 6.0)])
                .unwrap();
        let scores = Scores::new(vec![PlayerId::from(7), PlayerId::from(8)], vec![3.3, 0.5]).unwrap();

        let (truth, predicted) = align_truth(&dataset, &scores).unwrap();
        assert_eq!(truth, vec![2, -1, 6]);
        assert_eq!(predicted, vec![3.3, 0.5, 3.3]);
    }
}
