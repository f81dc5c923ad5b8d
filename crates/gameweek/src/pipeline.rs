//! End-to-end orchestration of one scoring run.

use crate::config::{ConfigError, OutputConfig, PipelineConfig};
use gameweek_data::{DataError, Dataset, load_csv};
use gameweek_features::{
    EncoderError, FeatureError, Normalizer, TextAssembler, TextEncoder, WordPieceEncoder,
};
use gameweek_output::{
    Evaluation, ExportError, ExportFormat, Exporter, OutputError, Prediction, RunReport,
    RunReportBuilder, align_truth, evaluate, postprocess,
};
use gameweek_scoring::{LinearScoringModel, ScoringError, ScoringModel, Scores, invoke};
use polars::prelude::DataFrame;
use std::path::Path;
use thiserror::Error;

/// Errors from any pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Loading or schema validation failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Text encoding failed
    #[error(transparent)]
    Encoder(#[from] EncoderError),

    /// Numeric normalization failed
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Model loading or invocation failed
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// Post-processing or evaluation failed
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Writing results failed
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Everything a successful run produced, held in memory until written.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Raw model scores, one per unique identifier
    pub scores: Scores,
    /// Final predictions, one per unique identifier
    pub predictions: Vec<Prediction>,
    /// Comparison against ground truth, when requested
    pub evaluation: Option<Evaluation>,
    /// Run summary
    pub report: RunReport,
}

impl RunOutcome {
    /// Write the predictions table.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_predictions(&self, path: &Path, format: ExportFormat) -> Result<()> {
        self.predictions.export_to_file(path, format)?;
        Ok(())
    }

    /// Write the comparison table as CSV, if the run was evaluated.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_evaluation(&self, path: &Path) -> Result<()> {
        if let Some(evaluation) = &self.evaluation {
            evaluation.export_to_file(path, ExportFormat::Csv)?;
        }
        Ok(())
    }

    /// Write the run report as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or writing fails.
    pub fn write_report(&self, path: &Path) -> Result<()> {
        self.report.export_to_file(path, ExportFormat::PrettyJson)?;
        Ok(())
    }

    /// Write every output the configuration names.
    ///
    /// # Errors
    /// Returns the first write failure.
    pub fn write_all(&self, output: &OutputConfig) -> Result<()> {
        self.write_predictions(&output.predictions, output.format)?;
        self.write_evaluation(&output.evaluation)?;
        if let Some(report) = &output.report {
            self.write_report(report)?;
        }
        Ok(())
    }
}

/// Validate, featurize, score and post-process one statistics table.
pub struct Pipeline {
    config: PipelineConfig,
    encoder: Box<dyn TextEncoder>,
    model: Box<dyn ScoringModel>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Assemble a pipeline from already-loaded components.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the configuration is inconsistent.
    pub fn new(
        config: PipelineConfig,
        encoder: Box<dyn TextEncoder>,
        model: Box<dyn ScoringModel>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            encoder,
            model,
        })
    }

    /// Load the vocabulary and model artifact named by `config`.
    ///
    /// # Errors
    /// Returns an error if either resource cannot be loaded.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let encoder = WordPieceEncoder::from_vocab_file(&config.encoder.vocab)?;
        let model = LinearScoringModel::load(&config.model.artifact)?;
        Self::new(config, Box::new(encoder), Box::new(model))
    }

    /// Active configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read the configured input and check its columns.
    ///
    /// # Errors
    /// Returns [`DataError::MissingColumns`] naming every absent column, or a
    /// read error.
    pub fn load_input(&self) -> Result<DataFrame> {
        let df = load_csv(&self.config.data.input)?;
        Ok(self.config.data.schema.validate(&df)?)
    }

    /// Run every stage on the configured input. Nothing is written.
    ///
    /// # Errors
    /// Returns the first stage failure.
    pub fn run(&self, with_evaluation: bool) -> Result<RunOutcome> {
        let df = self.load_input()?;
        self.run_frame(&df, with_evaluation)
    }

    /// Run every stage on an in-memory table. Nothing is written.
    ///
    /// # Errors
    /// Returns the first stage failure.
    pub fn run_frame(&self, df: &DataFrame, with_evaluation: bool) -> Result<RunOutcome> {
        let schema = &self.config.data.schema;
        let validated = schema.validate(df)?;
        let dataset = Dataset::from_frame(&validated, schema)?;
        let unique = dataset.deduplicate();
        log::info!(
            "Loaded {} records, {} unique players",
            dataset.len(),
            unique.len()
        );

        let assembler = TextAssembler::new(schema, self.config.encoder.max_length);
        let tokens = assembler.assemble(&unique, self.encoder.as_ref())?;
        let (features, _scaler) =
            Normalizer::new(self.config.scaling.zero_variance).normalize(&unique)?;

        let scores = invoke(self.model.as_ref(), &tokens, &features)?;
        let predictions = postprocess(&scores, &unique)?;

        let evaluation = if with_evaluation {
            let (truth, predicted) = align_truth(&dataset, &scores)?;
            Some(evaluate(&truth, &predicted)?)
        } else {
            None
        };

        let mut report = RunReportBuilder::new()
            .input(self.config.data.input.display().to_string())
            .counts(dataset.len(), unique.len())
            .model(self.model.name());
        if let Some(evaluation) = &evaluation {
            report = report.evaluation(evaluation);
        }

        Ok(RunOutcome {
            scores,
            predictions,
            evaluation,
            report: report.build(),
        })
    }
}
