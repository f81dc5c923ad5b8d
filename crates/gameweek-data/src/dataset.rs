//! Typed records extracted from the validated statistics table.

use crate::error::{DataError, Result};
use crate::schema::FeatureSchema;
use derive_more::{Display, From};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Rendering of an empty text cell, as the upstream tokenizer saw it.
pub const MISSING_TEXT: &str = "nan";

/// Player identifier, stable across game weeks.
///
/// Kept as the textual rendering of the source cell so that integer and
/// string identifiers both round-trip unchanged into the output file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for PlayerId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// One player at one game week.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Player identifier
    pub id: PlayerId,
    /// Category label (position)
    pub category: String,
    /// Period label (game week)
    pub period: String,
    /// Numeric features in schema order
    pub numeric: Vec<f64>,
    /// Rendered text columns in schema order
    pub text: Vec<String>,
    /// Value of the label column
    pub label: f64,
}

/// Ordered collection of records sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: FeatureSchema,
    records: Vec<Record>,
}

/// Read the whole statistics CSV into memory.
///
/// Column types are inferred from every row, so a column of whole numbers
/// with a late fractional value loads as `f64`.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DataError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| DataError::NonNumeric {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| DataError::MissingValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn required_text(values: Vec<Option<String>>, column: &str) -> Result<Vec<String>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| DataError::MissingValue {
                column: column.to_string(),
                row,
            })
        })
        .collect()
}

impl Dataset {
    /// Build records from a frame that already passed [`FeatureSchema::validate`].
    ///
    /// # Errors
    /// Returns an error when a required column is absent, a numeric column
    /// cannot be cast to `f64`, or an identifier, category, period or numeric
    /// cell is empty.
    pub fn from_frame(df: &DataFrame, schema: &FeatureSchema) -> Result<Self> {
        schema.check()?;
        let missing = schema.missing_columns(df);
        if !missing.is_empty() {
            return Err(DataError::MissingColumns { columns: missing });
        }

        let ids = required_text(text_column(df, &schema.id_column)?, &schema.id_column)?;
        let categories = required_text(
            text_column(df, &schema.category_column)?,
            &schema.category_column,
        )?;
        let periods = required_text(
            text_column(df, &schema.period_column)?,
            &schema.period_column,
        )?;
        let labels = numeric_column(df, &schema.label_column)?;

        let numeric: Vec<Vec<f64>> = schema
            .numeric_features
            .iter()
            .map(|name| numeric_column(df, name))
            .collect::<Result<_>>()?;
        let text: Vec<Vec<Option<String>>> = schema
            .text_columns
            .iter()
            .map(|name| text_column(df, name))
            .collect::<Result<_>>()?;

        let records = (0..df.height())
            .map(|row| Record {
                id: PlayerId(ids[row].clone()),
                category: categories[row].clone(),
                period: periods[row].clone(),
                numeric: numeric.iter().map(|col| col[row]).collect(),
                text: text
                    .iter()
                    .map(|col| col[row].clone().unwrap_or_else(|| MISSING_TEXT.to_string()))
                    .collect(),
                label: labels[row],
            })
            .collect();

        Ok(Self {
            schema: schema.clone(),
            records,
        })
    }

    /// Build a dataset from records that follow `schema`.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidSchema`] when a record's numeric or text
    /// width disagrees with the schema.
    pub fn from_records(schema: FeatureSchema, records: Vec<Record>) -> Result<Self> {
        schema.check()?;
        if let Some(bad) = records.iter().find(|r| {
            r.numeric.len() != schema.numeric_features.len()
                || r.text.len() != schema.text_columns.len()
        }) {
            return Err(DataError::InvalidSchema(format!(
                "record {} has {} numeric / {} text values, schema expects {} / {}",
                bad.id,
                bad.numeric.len(),
                bad.text.len(),
                schema.numeric_features.len(),
                schema.text_columns.len()
            )));
        }
        Ok(Self { schema, records })
    }

    /// Schema the records follow.
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Records in file order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers in record order, duplicates included.
    pub fn ids(&self) -> Vec<&PlayerId> {
        self.records.iter().map(|r| &r.id).collect()
    }

    /// Number of distinct identifiers.
    pub fn unique_ids(&self) -> usize {
        self.records
            .iter()
            .map(|r| &r.id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Collapse to one record per identifier, keeping the first occurrence.
    pub fn deduplicate(&self) -> Self {
        let mut seen = HashSet::new();
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| seen.insert(r.id.clone()))
            .cloned()
            .collect();
        log::debug!(
            "Deduplicated {} records to {} identifiers",
            self.records.len(),
            records.len()
        );
        Self {
            schema: self.schema.clone(),
            records,
        }
    }

    /// First record seen for each identifier.
    pub fn index_by_id(&self) -> HashMap<&PlayerId, &Record> {
        let mut index = HashMap::with_capacity(self.records.len());
        for record in &self.records {
            index.entry(&record.id).or_insert(record);
        }
        index
    }
}
