#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod encoder;
pub mod error;
pub mod scaling;
pub mod text;

pub use encoder::{TextEncoder, WordPieceEncoder};
pub use error::{EncoderError, FeatureError};
pub use scaling::{FeatureMatrix, Normalizer, StandardScaler, ZeroVariancePolicy};
pub use text::{DEFAULT_MAX_LENGTH, TextAssembler, TokenBatch};
