//! WordPiece encoder over a BERT-style vocabulary.
//!
//! The vocabulary file holds one token per line; a token's id is its
//! zero-based line number. Encoding follows the uncased BERT recipe:
//!
//! 1. drop control characters and isolate each CJK ideograph
//! 2. lowercase, then strip accents (NFD with nonspacing marks removed)
//! 3. split on whitespace, then split Unicode punctuation into standalone
//!    tokens
//! 4. greedy longest-match-first word pieces, continuations prefixed `##`
//! 5. frame the pieces as `[CLS] ... [SEP]`, truncating the pieces so both
//!    framing tokens survive

use super::TextEncoder;
use crate::error::EncoderError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_normalization::UnicodeNormalization;

const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const PAD_TOKEN: &str = "[PAD]";
const UNK_TOKEN: &str = "[UNK]";
const CONTINUATION_PREFIX: &str = "##";

/// Words longer than this many characters encode as `[UNK]`.
const MAX_CHARS_PER_WORD: usize = 100;

/// Encoder over a fixed WordPiece vocabulary
#[derive(Debug, Clone)]
pub struct WordPieceEncoder {
    vocab: HashMap<String, u32>,
    cls: u32,
    sep: u32,
    pad: u32,
    unk: u32,
}

impl WordPieceEncoder {
    /// Load a vocabulary file, one token per line.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is empty, or lacks one of
    /// `[CLS]`, `[SEP]`, `[PAD]`, `[UNK]`.
    pub fn from_vocab_file(path: &Path) -> Result<Self, EncoderError> {
        let contents = fs::read_to_string(path)?;
        let encoder = Self::from_tokens(contents.lines().map(|line| line.trim_end_matches('\r')))?;
        log::info!(
            "Loaded WordPiece vocabulary with {} tokens from {}",
            encoder.vocab_size(),
            path.display()
        );
        Ok(encoder)
    }

    /// Build from tokens in id order.
    ///
    /// Later duplicates of a token keep the first id.
    ///
    /// # Errors
    /// Returns an error if no tokens are given or a special token is missing.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = HashMap::new();
        for (id, token) in tokens.into_iter().enumerate() {
            let id = u32::try_from(id).map_err(|_| {
                EncoderError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "vocabulary exceeds u32 ids",
                ))
            })?;
            vocab.entry(token.into()).or_insert(id);
        }
        if vocab.is_empty() {
            return Err(EncoderError::EmptyVocabulary);
        }

        let lookup = |token: &str| {
            vocab
                .get(token)
                .copied()
                .ok_or_else(|| EncoderError::MissingSpecialToken(token.to_string()))
        };
        let cls = lookup(CLS_TOKEN)?;
        let sep = lookup(SEP_TOKEN)?;
        let pad = lookup(PAD_TOKEN)?;
        let unk = lookup(UNK_TOKEN)?;

        Ok(Self {
            vocab,
            cls,
            sep,
            pad,
            unk,
        })
    }

    /// Number of distinct tokens.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Id of a token, if present.
    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Lowercased, accent-free words with punctuation and CJK characters
    /// split out.
    fn basic_tokenize(text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        for c in text.chars() {
            if c.is_whitespace() {
                flush(&mut current, &mut words);
            } else if c.is_control() || c == '\u{fffd}' {
                continue;
            } else if is_cjk(c) {
                flush(&mut current, &mut words);
                words.push(c.to_string());
            } else {
                for d in c.to_lowercase().collect::<String>().nfd() {
                    if get_general_category(d) == GeneralCategory::NonspacingMark {
                        continue;
                    }
                    if is_punctuation(d) {
                        flush(&mut current, &mut words);
                        words.push(d.to_string());
                    } else {
                        current.push(d);
                    }
                }
            }
        }
        flush(&mut current, &mut words);
        words
    }

    /// Greedy longest-match-first split of one word.
    fn wordpiece(&self, word: &str, out: &mut Vec<u32>) {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_CHARS_PER_WORD {
            out.push(self.unk);
            return;
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;
            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate.insert_str(0, CONTINUATION_PREFIX);
                }
                if let Some(&id) = self.vocab.get(&candidate) {
                    found = Some(id);
                    break;
                }
                end -= 1;
            }
            match found {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                None => {
                    out.push(self.unk);
                    return;
                }
            }
        }
        out.extend(pieces);
    }
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

/// ASCII symbols count as punctuation even where Unicode files them as
/// symbols, such as `$` and `^`.
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            get_general_category(c),
            GeneralCategory::ConnectorPunctuation
                | GeneralCategory::DashPunctuation
                | GeneralCategory::OpenPunctuation
                | GeneralCategory::ClosePunctuation
                | GeneralCategory::InitialPunctuation
                | GeneralCategory::FinalPunctuation
                | GeneralCategory::OtherPunctuation
        )
}

/// CJK Unified Ideographs and their extension and compatibility blocks.
fn is_cjk(c: char) -> bool {
    matches!(
        u32::from(c),
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2B73F
            | 0x2B740..=0x2B81F
            | 0x2B820..=0x2CEAF
            | 0xF900..=0xFAFF
            | 0x2F800..=0x2FA1F
    )
}

impl TextEncoder for WordPieceEncoder {
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<u32>, EncoderError> {
        if max_length < 2 {
            return Err(EncoderError::MaxLengthTooSmall {
                max_length,
                required: 2,
            });
        }

        let mut pieces = Vec::new();
        for word in Self::basic_tokenize(text) {
            self.wordpiece(&word, &mut pieces);
        }
        pieces.truncate(max_length - 2);

        let mut ids = Vec::with_capacity(pieces.len() + 2);
        ids.push(self.cls);
        ids.extend(pieces);
        ids.push(self.sep);
        Ok(ids)
    }

    fn pad_token_id(&self) -> u32 {
        self.pad
    }
}
