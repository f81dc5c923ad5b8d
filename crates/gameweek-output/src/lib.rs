#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod evaluate;
pub mod export;
pub mod postprocess;
pub mod report;

pub use error::{ExportError, OutputError};
pub use evaluate::{Comparison, Evaluation, align_truth, evaluate};
pub use export::{ExportFormat, Exporter};
pub use postprocess::{Prediction, postprocess, round_score};
pub use report::{RunReport, RunReportBuilder};
