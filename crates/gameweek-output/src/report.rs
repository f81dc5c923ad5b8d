//! Run summary written next to the predictions.

use crate::evaluate::Evaluation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Input table path.
    pub input: String,

    /// Number of input records, duplicates included.
    pub records: usize,

    /// Number of unique identifiers scored.
    pub unique_ids: usize,

    /// Name of the scoring model.
    pub model: String,

    /// Mean squared error, when evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,

    /// Root mean squared error, when evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
}

impl RunReport {
    /// Create a report stamped with the current time.
    pub fn new(input: String, records: usize, unique_ids: usize, model: String) -> Self {
        Self {
            timestamp: Utc::now(),
            input,
            records,
            unique_ids,
            model,
            mse: None,
            rmse: None,
        }
    }
}

/// Builder for [`RunReport`].
#[derive(Debug, Default)]
pub struct RunReportBuilder {
    input: Option<String>,
    records: usize,
    unique_ids: usize,
    model: Option<String>,
    evaluation: Option<(f64, f64)>,
}

impl RunReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input path.
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Set record and unique-identifier counts.
    pub const fn counts(mut self, records: usize, unique_ids: usize) -> Self {
        self.records = records;
        self.unique_ids = unique_ids;
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Attach evaluation metrics.
    pub fn evaluation(mut self, evaluation: &Evaluation) -> Self {
        self.evaluation = Some((evaluation.mse, evaluation.rmse));
        self
    }

    /// Build the report.
    pub fn build(self) -> RunReport {
        let mut report = RunReport::new(
            self.input.unwrap_or_default(),
            self.records,
            self.unique_ids,
            self.model.unwrap_or_default(),
        );
        if let Some((mse, rmse)) = self.evaluation {
            report.mse = Some(mse);
            report.rmse = Some(rmse);
        }
        report
    }
}
