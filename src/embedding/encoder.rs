use std::collections::HashMap;

use super::aligner::PADDING_INDEX;
use super::vocab::UNKNOWN_TOKEN;
use crate::error::{PipelineError, Result};

/// Maps token streams into the aligned integer index space at a fixed
/// length.
///
/// Unknown tokens take the out-of-vocabulary row. Shorter sequences are
/// pre-padded with the padding index and longer ones are truncated from
/// the start, so the most recent `max_len` tokens survive; the same
/// convention must be used at training and at inference time, which is why
/// it lives here and nowhere else.
#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder {
    max_len: usize,
}

impl SequenceEncoder {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Encodes one token stream to exactly `max_len` indices.
    ///
    /// # Errors
    /// * `UnknownTokenState` if the index map has no out-of-vocabulary
    ///   entry; that map cannot have come from a vocabulary built by this
    ///   pipeline.
    pub fn encode(
        &self,
        tokens: &[String],
        word_index: &HashMap<String, usize>,
    ) -> Result<Vec<usize>> {
        let unknown = *word_index.get(UNKNOWN_TOKEN).ok_or_else(|| {
            PipelineError::UnknownTokenState(format!(
                "index map has no '{}' entry",
                UNKNOWN_TOKEN
            ))
        })?;

        let indices: Vec<usize> = tokens
            .iter()
            .map(|token| word_index.get(token.as_str()).copied().unwrap_or(unknown))
            .collect();

        if indices.len() >= self.max_len {
            return Ok(indices[indices.len() - self.max_len..].to_vec());
        }
        let mut padded = vec![PADDING_INDEX; self.max_len - indices.len()];
        padded.extend(indices);
        Ok(padded)
    }
}
