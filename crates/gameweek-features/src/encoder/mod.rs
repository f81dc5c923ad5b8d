//! Text encoder boundary.
//!
//! The pipeline treats the tokenizer as an injected capability: anything that
//! maps a string to token ids can stand in for the pretrained vocabulary.

pub mod wordpiece;

pub use wordpiece::WordPieceEncoder;

use crate::error::EncoderError;

/// Trait for text encoders feeding the scoring model
pub trait TextEncoder {
    /// Encode one string into token ids.
    ///
    /// Implementations add their own framing tokens and should not return
    /// more than `max_length` ids; callers truncate on the right regardless.
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>, EncoderError>;

    /// Id used to right-pad short sequences.
    fn pad_token_id(&self) -> u32;
}

impl<T: TextEncoder + ?Sized> TextEncoder for &T {
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>, EncoderError> {
        (**self).encode(text, max_length)
    }

    fn pad_token_id(&self) -> u32 {
        (**self).pad_token_id()
    }
}

impl<T: TextEncoder + ?Sized> TextEncoder for Box<T> {
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>, EncoderError> {
        (**self).encode(text, max_length)
    }

    fn pad_token_id(&self) -> u32 {
        (**self).pad_token_id()
    }
}
