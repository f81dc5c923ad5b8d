#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod pipeline;

// Re-export main types from sub-crates
pub use gameweek_data as data;
pub use gameweek_features as features;
pub use gameweek_output as output;
pub use gameweek_scoring as scoring;

pub use config::{
    ConfigError, DataConfig, EncoderConfig, ModelConfig, OutputConfig, PipelineConfig,
    ScalingConfig,
};
pub use pipeline::{Pipeline, PipelineError, Result, RunOutcome};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
