#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod schema;

pub use dataset::{Dataset, MISSING_TEXT, PlayerId, Record, load_csv};
pub use error::{DataError, Result};
pub use schema::{DEFAULT_NUMERIC_FEATURES, FeatureSchema};
