//! Gameweek CLI binary.
//!
//! Scores one game week of player statistics and optionally compares the raw
//! scores with the recorded points.

use clap::{Args, Parser, Subcommand};
use gameweek::data::load_csv;
use gameweek::output::ExportFormat;
use gameweek::{Pipeline, PipelineConfig, RunOutcome};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "gameweek")]
#[command(about = "Gameweek: fantasy-football player point predictions", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = "gameweek.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by the scoring commands.
#[derive(Args)]
struct RunArgs {
    /// Player statistics CSV
    #[arg(long)]
    input: Option<PathBuf>,

    /// Model artifact
    #[arg(long)]
    model: Option<PathBuf>,

    /// WordPiece vocabulary
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every player and write the predictions table
    Predict {
        #[command(flatten)]
        run: RunArgs,

        /// Predictions file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Predictions format (csv, json or prettyjson)
        #[arg(long)]
        format: Option<ExportFormat>,
    },

    /// Score every player and compare raw scores with recorded points
    Evaluate {
        #[command(flatten)]
        run: RunArgs,

        /// Comparison table
        #[arg(long)]
        comparison: Option<PathBuf>,

        /// Also write the predictions table here
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check that the input has every required column
    Validate {
        /// Player statistics CSV
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List the required input columns
    Schema,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::load_or_default(Some(&cli.config))?;

    match cli.command {
        Commands::Predict {
            run,
            output,
            format,
        } => {
            apply_run_args(&mut config, run);
            if let Some(output) = output {
                config.output.predictions = output;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            predict(config)?;
        }
        Commands::Evaluate {
            run,
            comparison,
            output,
        } => {
            apply_run_args(&mut config, run);
            if let Some(comparison) = comparison {
                config.output.evaluation = comparison;
            }
            evaluate(config, output.as_deref())?;
        }
        Commands::Validate { input } => {
            if let Some(input) = input {
                config.data.input = input;
            }
            validate(&config)?;
        }
        Commands::Schema => print_schema(&config),
    }

    Ok(())
}

fn apply_run_args(config: &mut PipelineConfig, args: RunArgs) {
    if let Some(input) = args.input {
        config.data.input = input;
    }
    if let Some(model) = args.model {
        config.model.artifact = model;
    }
    if let Some(vocab) = args.vocab {
        config.encoder.vocab = vocab;
    }
    if args.report.is_some() {
        config.output.report = args.report;
    }
}

fn predict(config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::from_config(config)?;
    let outcome = pipeline.run(false)?;
    let output = &pipeline.config().output;

    outcome.write_predictions(&output.predictions, output.format)?;
    write_report(&outcome, output.report.as_deref())?;

    println!(
        "Predictions for {} players saved to {}",
        outcome.predictions.len(),
        output.predictions.display()
    );
    Ok(())
}

fn evaluate(
    config: PipelineConfig,
    predictions: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::from_config(config)?;
    let outcome = pipeline.run(true)?;
    let output = &pipeline.config().output;

    outcome.write_evaluation(&output.evaluation)?;
    if let Some(path) = predictions {
        outcome.write_predictions(path, output.format)?;
    }
    write_report(&outcome, output.report.as_deref())?;

    if let Some(evaluation) = &outcome.evaluation {
        println!("Mean Squared Error (MSE): {}", evaluation.mse);
        println!("Root Mean Squared Error (RMSE): {}", evaluation.rmse);
    }
    println!("Comparison saved to {}", output.evaluation.display());
    Ok(())
}

fn write_report(outcome: &RunOutcome, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = path {
        outcome.write_report(path)?;
        log::info!("Run report saved to {}", path.display());
    }
    Ok(())
}

fn validate(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let schema = &config.data.schema;
    let df = load_csv(&config.data.input)?;
    schema.validate(&df)?;
    println!(
        "{}: {} rows, all {} required columns present",
        config.data.input.display(),
        df.height(),
        schema.required_columns().len()
    );
    Ok(())
}

fn print_schema(config: &PipelineConfig) {
    let schema = &config.data.schema;
    let columns = schema.required_columns();

    println!("Required columns ({}):", columns.len());
    println!("======================\n");
    for column in columns {
        let mut roles = Vec::new();
        if column == schema.id_column {
            roles.push("identifier");
        }
        if column == schema.category_column {
            roles.push("position");
        }
        if column == schema.period_column {
            roles.push("game week");
        }
        if column == schema.label_column {
            roles.push("label");
        }
        if schema.numeric_features.iter().any(|c| c == column) {
            roles.push("numeric");
        }
        println!("  {:40} {}", column, roles.join(", "));
    }
}
