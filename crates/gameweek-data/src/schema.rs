//! Required column set and the schema validator.
//!
//! The schema is an explicit value rather than module state so callers and
//! tests can swap the feature set. [`FeatureSchema::default`] reproduces the
//! column layout of the Mister fantasy statistics export.

use crate::error::{DataError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered numeric feature list of the statistics export.
///
/// The order is the column order of the feature matrix and must match the
/// order the scoring model was trained with.
pub const DEFAULT_NUMERIC_FEATURES: &[&str] = &[
    "Position",
    "Game Week",
    "Mixed",
    "Average",
    "Matches",
    "Goals Metadata",
    "Cards",
    "Total Passes",
    "Accurate Passes",
    "Total Long Balls",
    "Accurate Long Balls",
    "Total Crosses",
    "Accurate Crosses",
    "Total clearances",
    "Clearances on goal line",
    "Aerial Duels Lost",
    "Aerial Duels Won",
    "Duels Lost",
    "Duels Won",
    "Dribbled Past",
    "Losses",
    "Total Dribbles",
    "Completed dribbles",
    "High clearances",
    "Fist clearances",
    "Failures that lead to shot",
    "Failures that lead to goal",
    "Shots Off Target",
    "Shots on Target",
    "Shots blocked in attack",
    "Shots blocked in defence",
    "Occasions created",
    "Goal assists",
    "Shots to the crossbar",
    "Failed obvious occasions",
    "Penalties commited",
    "Penalties caused",
    "Failed penalties",
    "Stopped penalties",
    "Goals",
    "Own goals",
    "Stops from inside the area",
    "Stops",
    "Goals avoided",
    "Interceptions",
    "Total outputs",
    "Precise outputs",
    "Total Tackles",
    "Fouls Received",
    "Fouls Committed",
    "Offsides",
    "Minutes Played",
    "Touches",
    "Entries as last man",
    "Possessions Lost",
    "Expected Goals",
    "Key Passes",
    "Expected Assists",
    "Average Season 15/16",
    "Average Season 16/17",
    "Average Season 17/18",
    "Average Season 18/19",
    "Average Season 19/20",
    "Average Season 20/21",
    "Average Season 21/22",
    "Average Season 22/23",
    "Average Season 23/24",
];

/// Column layout the pipeline depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSchema {
    /// Player identifier column, stable across game weeks
    pub id_column: String,
    /// Role / position column copied into the predictions
    pub category_column: String,
    /// Game week column copied into the predictions
    pub period_column: String,
    /// Training label column, excluded from the text features and used as
    /// ground truth during evaluation
    pub label_column: String,
    /// Numeric feature columns in matrix order
    pub numeric_features: Vec<String>,
    /// Columns concatenated into the text feature, in join order
    pub text_columns: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        let features: Vec<String> = DEFAULT_NUMERIC_FEATURES
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        Self {
            id_column: "ID".to_string(),
            category_column: "Position".to_string(),
            period_column: "Game Week".to_string(),
            label_column: "Mixed".to_string(),
            text_columns: features.clone(),
            numeric_features: features,
        }
    }
}

impl FeatureSchema {
    /// Check the schema is internally consistent.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidSchema`] when the numeric list is empty,
    /// contains duplicates, or the label column doubles as the identifier.
    pub fn check(&self) -> Result<()> {
        if self.numeric_features.is_empty() {
            return Err(DataError::InvalidSchema(
                "numeric feature list is empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self
            .numeric_features
            .iter()
            .find(|name| !seen.insert(name.as_str()))
        {
            return Err(DataError::InvalidSchema(format!(
                "numeric feature '{dup}' listed twice"
            )));
        }
        if self.label_column == self.id_column {
            return Err(DataError::InvalidSchema(format!(
                "label column '{}' is also the identifier column",
                self.label_column
            )));
        }
        Ok(())
    }

    /// Every column the pipeline reads, in first-mention order without repeats.
    ///
    /// Identifier first, then the numeric features, then whichever of the
    /// category, period, label and text columns the numeric list did not
    /// already name.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        std::iter::once(self.id_column.as_str())
            .chain(self.numeric_features.iter().map(String::as_str))
            .chain([
                self.category_column.as_str(),
                self.period_column.as_str(),
                self.label_column.as_str(),
            ])
            .chain(self.text_columns.iter().map(String::as_str))
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Required columns absent from `df`, in schema order.
    pub fn missing_columns(&self, df: &DataFrame) -> Vec<String> {
        let present: HashSet<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        self.required_columns()
            .into_iter()
            .filter(|name| !present.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Reject `df` unless every required column is present.
    ///
    /// On success the frame is narrowed to exactly
    /// [`required_columns`](Self::required_columns), preserving row order.
    ///
    /// # Errors
    /// Returns [`DataError::MissingColumns`] naming every absent column.
    pub fn validate(&self, df: &DataFrame) -> Result<DataFrame> {
        let missing = self.missing_columns(df);
        if !missing.is_empty() {
            return Err(DataError::MissingColumns { columns: missing });
        }
        Ok(df.select(self.required_columns())?)
    }

    /// Text columns that feed the encoder: the configured list minus the label.
    pub fn encoder_columns(&self) -> Vec<&str> {
        self.text_columns
            .iter()
            .map(String::as_str)
            .filter(|name| *name != self.label_column)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_schema() -> FeatureSchema {
        FeatureSchema {
            id_column: "ID".to_string(),
            category_column: "Position".to_string(),
            period_column: "Game Week".to_string(),
            label_column: "Mixed".to_string(),
            numeric_features: vec![
                "Position".to_string(),
                "Game Week".to_string(),
                "Mixed".to_string(),
                "Goals".to_string(),
            ],
            text_columns: vec!["Position".to_string(), "Mixed".to_string()],
        }
    }

    fn frame(columns: &[&str]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|name| Column::new((*name).into(), [1.0, 2.0, 3.0]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_schema_layout() {
        let schema = FeatureSchema::default();
        assert_eq!(schema.numeric_features.len(), 67);
        assert_eq!(schema.required_columns().len(), 68);
        assert_eq!(schema.required_columns()[0], "ID");
        assert!(schema.check().is_ok());
    }

    #[test]
    fn test_encoder_columns_drop_label() {
        let schema = FeatureSchema::default();
        let cols = schema.encoder_columns();
        assert_eq!(cols.len(), 66);
        assert!(!cols.contains(&"Mixed"));
        assert_eq!(cols[0], "Position");
        assert_eq!(cols[1], "Game Week");
        assert_eq!(cols[2], "Average");
    }

    #[test]
    fn test_validate_narrows_and_orders() {
        let schema = small_schema();
        let df = frame(&["Extra", "Goals", "Mixed", "ID", "Game Week", "Position"]);
        let narrowed = schema.validate(&df).unwrap();
        let names: Vec<&str> = narrowed
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["ID", "Position", "Game Week", "Mixed", "Goals"]);
        assert_eq!(narrowed.height(), 3);
    }

    #[test]
    fn test_validate_names_missing_goals() {
        let schema = small_schema();
        let df = frame(&["ID", "Position", "Game Week", "Mixed"]);
        let err = schema.validate(&df).unwrap_err();
        match &err {
            DataError::MissingColumns { columns } => assert_eq!(columns, &["Goals"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Goals"));
    }

    #[test]
    fn test_validate_reports_every_missing_column() {
        let schema = small_schema();
        let df = frame(&["Position"]);
        let missing = schema.missing_columns(&df);
        assert_eq!(missing, vec!["ID", "Game Week", "Mixed", "Goals"]);
    }

    #[test]
    fn test_check_rejects_duplicates() {
        let mut schema = small_schema();
        schema.numeric_features.push("Goals".to_string());
        assert!(matches!(schema.check(), Err(DataError::InvalidSchema(_))));
    }

    #[test]
    fn test_check_rejects_label_as_id() {
        let mut schema = small_schema();
        schema.label_column = "ID".to_string();
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_check_rejects_empty_features() {
        let mut schema = small_schema();
        schema.numeric_features.clear();
        assert!(schema.check().is_err());
    }
}
