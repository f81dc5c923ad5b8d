//! End-to-end runs over CSV files on disk.

use approx::assert_relative_eq;
use gameweek::data::{DataError, PlayerId};
use gameweek::output::ExportFormat;
use gameweek::{Pipeline, PipelineConfig, PipelineError};
use std::fs;
use std::path::PathBuf;

const VOCAB: &str = "[PAD]\n[UNK]\n[CLS]\n[SEP]\n0\n1\n2\n4\n6\n.\n";

const MODEL: &str = r#"{
    "name": "gw-linear",
    "sequence_length": 16,
    "feature_weights": [1.0, 1.0],
    "mask_weight": 0.0,
    "bias": 0.0
}"#;

/// Fresh directory holding a vocabulary, a model artifact and `input.csv`.
fn workspace(name: &str, csv: &str) -> (PathBuf, PipelineConfig) {
    let dir = std::env::temp_dir().join(format!("gameweek_pipeline_{name}"));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("vocab.txt"), VOCAB).unwrap();
    fs::write(dir.join("model.json"), MODEL).unwrap();
    fs::write(dir.join("input.csv"), csv).unwrap();

    let mut config = PipelineConfig::default();
    config.data.input = dir.join("input.csv");
    config.data.schema.numeric_features = vec!["Mixed".into(), "Goals".into()];
    config.data.schema.text_columns = vec!["Mixed".into(), "Goals".into()];
    config.encoder.vocab = dir.join("vocab.txt");
    config.encoder.max_length = 16;
    config.model.artifact = dir.join("model.json");
    config.output.predictions = dir.join("out").join("predictions.csv");
    config.output.evaluation = dir.join("comparison.csv");
    config.output.report = Some(dir.join("report.json"));
    (dir, config)
}

#[test]
fn test_happy_path_preserves_order() {
    let csv = "ID,Position,Game Week,Mixed,Goals\n\
               101,1,5,2,0\n\
               102,2,5,6,1\n\
               103,3,5,4,2\n";
    let (dir, config) = workspace("happy", csv);
    let pipeline = Pipeline::from_config(config.clone()).unwrap();

    let outcome = pipeline.run(false).unwrap();
    let ids: Vec<&PlayerId> = outcome.predictions.iter().map(|p| &p.id).collect();
    assert_eq!(
        ids,
        vec![
            &PlayerId::from(101),
            &PlayerId::from(102),
            &PlayerId::from(103)
        ]
    );
    // z-scores: Mixed [-1.22, 1.22, 0], Goals [-1.22, 0, 1.22]
    assert_relative_eq!(outcome.scores.values[0], -6.0_f64.sqrt(), epsilon = 1e-9);
    let values: Vec<u64> = outcome
        .predictions
        .iter()
        .map(|p| p.predicted_value)
        .collect();
    assert_eq!(values, vec![2, 1, 1]);
    assert!(outcome.evaluation.is_none());

    outcome.write_all(&config.output).unwrap();
    let written = fs::read_to_string(&config.output.predictions).unwrap();
    assert_eq!(
        written,
        "ID,Position,PredictedValue,GameWeek\n101,1,2,5\n102,2,1,5\n103,3,1,5\n"
    );
    assert!(!config.output.evaluation.exists());
    assert!(dir.join("report.json").exists());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_missing_column_writes_nothing() {
    let csv = "ID,Position,Game Week,Mixed\n101,1,5,2\n102,2,5,6\n";
    let (dir, config) = workspace("missing", csv);
    let pipeline = Pipeline::from_config(config.clone()).unwrap();

    let result = pipeline
        .run(false)
        .and_then(|outcome| outcome.write_all(&config.output));
    match result {
        Err(PipelineError::Data(DataError::MissingColumns { columns })) => {
            assert_eq!(columns, vec!["Goals".to_string()]);
        }
        other => panic!("expected missing columns, got {other:?}"),
    }
    assert!(!config.output.predictions.exists());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_duplicate_identifier_first_row_wins() {
    let csv = "ID,Position,Game Week,Mixed,Goals\n\
               101,2,7,3,1\n\
               102,4,7,5,0\n\
               101,3,8,9,4\n";
    let (dir, config) = workspace("duplicates", csv);
    let pipeline = Pipeline::from_config(config).unwrap();

    let outcome = pipeline.run(true).unwrap();
    assert_eq!(outcome.predictions.len(), 2);
    assert_eq!(outcome.predictions[0].id, PlayerId::from(101));
    assert_eq!(outcome.predictions[0].category, "2");
    assert_eq!(outcome.predictions[0].period, "7");

    let evaluation = outcome.evaluation.unwrap();
    assert_eq!(evaluation.len(), 3);
    assert_eq!(evaluation.rows[2].real_value, 9);
    assert_relative_eq!(
        evaluation.rows[2].predicted_value,
        evaluation.rows[0].predicted_value
    );
    assert_eq!(outcome.report.records, 3);
    assert_eq!(outcome.report.unique_ids, 2);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_stage_lengths_agree() {
    let mut csv = String::from("ID,Position,Game Week,Mixed,Goals\n");
    for id in 0..25 {
        csv.push_str(&format!("{},{},12,{},{}\n", id % 20, id % 4, id * 3 % 7, id % 5));
    }
    let (dir, mut config) = workspace("alignment", &csv);
    config.output.format = ExportFormat::Json;
    let pipeline = Pipeline::from_config(config.clone()).unwrap();

    let outcome = pipeline.run(true).unwrap();
    assert_eq!(outcome.scores.len(), 20);
    assert_eq!(outcome.predictions.len(), outcome.scores.len());
    for (prediction, key) in outcome.predictions.iter().zip(&outcome.scores.keys) {
        assert_eq!(&prediction.id, key);
    }
    assert_eq!(outcome.evaluation.as_ref().map(|e| e.len()), Some(25));

    outcome.write_all(&config.output).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.output.predictions).unwrap()).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(20));
    let comparison = fs::read_to_string(&config.output.evaluation).unwrap();
    assert_eq!(comparison.lines().count(), 26);
    assert!(comparison.starts_with("Real Value,Predicted Value\n"));

    fs::remove_dir_all(dir).ok();
}
