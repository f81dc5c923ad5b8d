//! Turning raw scores into the final prediction table.

use crate::error::OutputError;
use gameweek_data::{Dataset, PlayerId};
use gameweek_scoring::Scores;
use serde::{Deserialize, Serialize};

/// Final predicted points for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Player identifier
    #[serde(rename = "ID")]
    pub id: PlayerId,
    /// Position label
    #[serde(rename = "Position")]
    pub category: String,
    /// Rounded, sign-corrected score
    #[serde(rename = "PredictedValue")]
    pub predicted_value: u64,
    /// Game week label
    #[serde(rename = "GameWeek")]
    pub period: String,
}

/// `abs(round(raw))`, ties to even.
///
/// Negative scores are folded onto their magnitude rather than rejected.
///
/// # Errors
/// Returns [`OutputError::NonFiniteScore`] for NaN or infinite input.
pub fn round_score(id: &PlayerId, raw: f64) -> Result<u64, OutputError> {
    if !raw.is_finite() {
        return Err(OutputError::NonFiniteScore {
            id: id.to_string(),
            value: raw,
        });
    }
    Ok(raw.round_ties_even().abs() as u64)
}

/// Build one prediction per score, joining on identifier.
///
/// Category and period come from the first record of each identifier.
///
/// # Errors
/// Returns an error if a score has no matching record or is not finite.
pub fn postprocess(scores: &Scores, dataset: &Dataset) -> Result<Vec<Prediction>, OutputError> {
    let index = dataset.index_by_id();
    let predictions = scores
        .iter()
        .map(|(id, raw)| -> Result<Prediction, OutputError> {
            let record = index
                .get(id)
                .ok_or_else(|| OutputError::UnknownIdentifier(id.to_string()))?;
            Ok(Prediction {
                id: id.clone(),
                category: record.category.clone(),
                predicted_value: round_score(id, raw)?,
                period: record.period.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Post-processed {} predictions", predictions.len());
    Ok(predictions)
}
