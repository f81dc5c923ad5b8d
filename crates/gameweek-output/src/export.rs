//! CSV and JSON export of predictions, evaluations and run reports.

use crate::error::ExportError;
use crate::evaluate::Evaluation;
use crate::postprocess::Prediction;
use crate::report::RunReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "prettyjson",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "prettyjson" | "pretty-json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format, replacing any existing
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        log::info!("Wrote {} to {}", format, path.display());
        Ok(())
    }
}

fn to_csv<'a, T, I>(rows: I) -> Result<String, ExportError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

impl Exporter for [Prediction] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self),
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}

impl Exporter for Vec<Prediction> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.as_slice().export_to_string(format)
    }
}

impl Exporter for Evaluation {
    /// CSV holds only the comparison rows; JSON also carries the metrics.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(&self.rows),
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}

impl Exporter for RunReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => Err(ExportError::InvalidFormat(
                "run reports are JSON only".to_string(),
            )),
            ExportFormat::Json | ExportFormat::PrettyJson => to_json(self, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::Comparison;
    use gameweek_data::PlayerId;
    use rstest::rstest;

    fn predictions() -> Vec<Prediction> {
        vec![
            Prediction {
                id: PlayerId::from(101),
                category: "2".into(),
                predicted_value: 5,
                period: "10".into(),
            },
            Prediction {
                id: PlayerId::from(102),
                category: "4".into(),
                predicted_value: 0,
                period: "10".into(),
            },
        ]
    }

    #[test]
    fn test_predictions_csv() {
        let csv = predictions().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec!["ID,Position,PredictedValue,GameWeek", "101,2,5,10", "102,4,0,10"]
        );
    }

    #[test]
    fn test_predictions_json() {
        let json = predictions().export_to_string(ExportFormat::Json).unwrap();
        let parsed: Vec<Prediction> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, predictions());
        assert!(json.contains("\"PredictedValue\":5"));
    }

    #[test]
    fn test_evaluation_csv() {
        let evaluation = Evaluation {
            mse: 0.25,
            rmse: 0.5,
            rows: vec![Comparison {
                real_value: 2,
                predicted_value: 2.5,
            }],
        };
        let csv = evaluation.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv, "Real Value,Predicted Value\n2,2.5\n");

        let json = evaluation.export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"rmse\":0.5"));
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_format_from_str(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_format_from_str_unknown() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_to_file_overwrites() {
        let path = std::env::temp_dir().join("gameweek_output_export_test.csv");
        std::fs::write(&path, "stale contents that are longer than the new file\n").unwrap();
        predictions()
            .export_to_file(&path, ExportFormat::Csv)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("ID,Position,PredictedValue,GameWeek\n"));
        assert!(!written.contains("stale"));
        std::fs::remove_file(path).ok();
    }
}
