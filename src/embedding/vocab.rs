use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::Result;
use crate::tokenize::Tokenizer;

/// The out-of-vocabulary sentinel token.
pub const UNKNOWN_TOKEN: &str = "<UNK>";

/// Synthetic count assigned to [`UNKNOWN_TOKEN`]. High enough to survive
/// any realistic minimum-count filter applied during alignment.
pub const UNKNOWN_TOKEN_COUNT: u64 = 100;

/// Raw per-token occurrence counts over a training corpus.
///
/// Unlike document frequency, repeats accumulate both within and across
/// documents. The vocabulary always contains exactly one entry for the
/// out-of-vocabulary sentinel, injected with a synthetic count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    counts: HashMap<String, u64>,
}

impl Vocabulary {
    /// Scans the corpus once and counts token occurrences.
    ///
    /// The tokenizer here is typically the filtering variant, configured
    /// independently of the one used for term statistics. Documents the
    /// tokenizer rejects are logged and skipped without partial counting.
    pub fn build(corpus: &Corpus, tokenizer: &dyn Tokenizer) -> Result<Self> {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for document in corpus.iter() {
            match tokenizer.tokens(document.text()) {
                Ok(tokens) => {
                    for token in tokens {
                        *counts.entry(token).or_insert(0) += 1;
                    }
                }
                Err(e) => {
                    warn!("Skipping uncountable document: {}", e);
                }
            }
        }
        counts.insert(UNKNOWN_TOKEN.to_string(), UNKNOWN_TOKEN_COUNT);
        info!("Built vocabulary: {} tokens", counts.len());
        Ok(Self { counts })
    }

    /// Wraps an existing count map, injecting the sentinel if absent
    pub fn from_counts(mut counts: HashMap<String, u64>) -> Self {
        counts
            .entry(UNKNOWN_TOKEN.to_string())
            .or_insert(UNKNOWN_TOKEN_COUNT);
        Self { counts }
    }

    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    pub fn count_of(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
