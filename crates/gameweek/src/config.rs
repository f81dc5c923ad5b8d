//! Pipeline configuration loaded from TOML.

use gameweek_data::FeatureSchema;
use gameweek_features::{DEFAULT_MAX_LENGTH, ZeroVariancePolicy};
use gameweek_output::ExportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or checking the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("Failed to access config file {path}: {source}")]
    Io {
        /// Config path
        path: String,
        /// Underlying failure
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`PipelineConfig`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Input table and its column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Statistics CSV
    pub input: PathBuf,
    /// Column layout
    #[serde(flatten)]
    pub schema: FeatureSchema,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./data/fantasy-games-week-players-stats.csv"),
            schema: FeatureSchema::default(),
        }
    }
}

/// Text encoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// WordPiece vocabulary, one token per line
    pub vocab: PathBuf,
    /// Tokens per sequence
    pub max_length: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            vocab: PathBuf::from("models/vocab.txt"),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Scoring model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model artifact
    pub artifact: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact: PathBuf::from("models/best_model.json"),
        }
    }
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Predictions file
    pub predictions: PathBuf,
    /// Comparison table written by evaluation runs
    pub evaluation: PathBuf,
    /// Predictions file format
    pub format: ExportFormat,
    /// Optional JSON run report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            predictions: PathBuf::from("./predictions/predictions_mundo_deportivo.csv"),
            evaluation: PathBuf::from("model_predictions_comparison2.csv"),
            format: ExportFormat::Csv,
            report: None,
        }
    }
}

/// Numeric normalization settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Handling of constant columns
    pub zero_variance: ZeroVariancePolicy,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input settings
    pub data: DataConfig,
    /// Encoder settings
    pub encoder: EncoderConfig,
    /// Model settings
    pub model: ModelConfig,
    /// Output settings
    pub output: OutputConfig,
    /// Scaling settings
    pub scaling: ScalingConfig,
}

impl PipelineConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::Invalid`] if the values fail [`validate`](Self::validate).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file is unreadable, malformed or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to the defaults.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder.max_length == 0 {
            return Err(ConfigError::Invalid(
                "encoder.max_length must be positive".to_string(),
            ));
        }
        self.data
            .schema
            .check()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.encoder.max_length, 128);
        assert_eq!(config.data.schema.id_column, "ID");
        assert_eq!(config.output.format, ExportFormat::Csv);
        assert_eq!(config.scaling.zero_variance, ZeroVariancePolicy::Center);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml(
            r#"
            [data]
            input = "week12.csv"
            id_column = "PlayerID"

            [output]
            format = "json"

            [scaling]
            zero_variance = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(config.data.input, PathBuf::from("week12.csv"));
        assert_eq!(config.data.schema.id_column, "PlayerID");
        assert_eq!(config.data.schema.label_column, "Mixed");
        assert_eq!(config.output.format, ExportFormat::Json);
        assert_eq!(config.scaling.zero_variance, ZeroVariancePolicy::Reject);
        assert_eq!(config.encoder.max_length, 128);
    }

    #[rstest]
    #[case::zero_max_length("[encoder]\nmax_length = 0\n")]
    #[case::label_is_identifier("[data]\nlabel_column = \"ID\"\n")]
    #[case::no_numeric_features("[data]\nnumeric_features = []\n")]
    fn test_invalid_values(#[case] content: &str) {
        assert!(matches!(
            PipelineConfig::from_toml(content),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            PipelineConfig::from_toml("[encoder\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("gameweek_config_test.toml");
        let mut config = PipelineConfig::default();
        config.model.artifact = PathBuf::from("elsewhere.json");
        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("gameweek_config_absent.toml");
        assert_eq!(
            PipelineConfig::load_or_default(Some(&path)).unwrap(),
            PipelineConfig::default()
        );
    }
}
