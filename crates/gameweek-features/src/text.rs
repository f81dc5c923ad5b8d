//! Text-feature assembly.
//!
//! Joins the configured text columns of each record with a single space and
//! encodes the result into fixed-length token ids plus an attention mask.

use crate::encoder::TextEncoder;
use crate::error::EncoderError;
use gameweek_data::{Dataset, FeatureSchema, PlayerId};
use ndarray::Array2;

/// Token sequence length the scoring model was trained with.
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// Fixed-length token ids and attention mask, one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    /// Identifier of each row
    pub keys: Vec<PlayerId>,
    /// Token ids, `rows x max_length`
    pub ids: Array2<u32>,
    /// 1 for real tokens, 0 for padding
    pub mask: Array2<u8>,
}

impl TokenBatch {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sequence length of every row.
    pub fn max_length(&self) -> usize {
        self.ids.ncols()
    }

    /// Build from raw per-row sequences, truncating and padding on the right.
    pub fn from_sequences(
        keys: Vec<PlayerId>,
        sequences: &[Vec<u32>],
        max_length: usize,
        pad_id: u32,
    ) -> Self {
        let rows = sequences.len();
        let mut ids = Array2::from_elem((rows, max_length), pad_id);
        let mut mask = Array2::<u8>::zeros((rows, max_length));
        for (row, sequence) in sequences.iter().enumerate() {
            for (pos, &token) in sequence.iter().take(max_length).enumerate() {
                ids[[row, pos]] = token;
                mask[[row, pos]] = 1;
            }
        }
        Self { keys, ids, mask }
    }
}

/// Builds the token representation from a dataset.
#[derive(Debug, Clone)]
pub struct TextAssembler {
    columns: Vec<String>,
    max_length: usize,
}

impl TextAssembler {
    /// Use the schema's text columns minus the label column.
    pub fn new(schema: &FeatureSchema, max_length: usize) -> Self {
        Self {
            columns: schema
                .encoder_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            max_length,
        }
    }

    /// Columns joined into each record's text, in join order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Sequence length of the produced batch.
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Per-record strings handed to the encoder.
    ///
    /// Columns absent from the dataset's text columns are skipped.
    pub fn texts(&self, dataset: &Dataset) -> Vec<String> {
        let text_columns = &dataset.schema().text_columns;
        let positions: Vec<usize> = self
            .columns
            .iter()
            .filter_map(|name| text_columns.iter().position(|c| c == name))
            .collect();

        dataset
            .records()
            .iter()
            .map(|record| {
                positions
                    .iter()
                    .map(|&i| record.text[i].as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Encode every record of `dataset`, in dataset order.
    ///
    /// # Errors
    /// Encoder failures are returned unchanged.
    pub fn assemble(
        &self,
        dataset: &Dataset,
        encoder: &dyn TextEncoder,
    ) -> Result<TokenBatch, EncoderError> {
        let sequences = self
            .texts(dataset)
            .iter()
            .map(|text| encoder.encode(text, self.max_length))
            .collect::<Result<Vec<_>, _>>()?;

        let keys = dataset.records().iter().map(|r| r.id.clone()).collect();
        let batch =
            TokenBatch::from_sequences(keys, &sequences, self.max_length, encoder.pad_token_id());
        log::info!(
            "Encoded {} text rows into {} tokens each",
            batch.len(),
            batch.max_length()
        );
        Ok(batch)
    }
}
