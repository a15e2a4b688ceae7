use std::collections::HashSet;

use crate::error::Result;

/// The tokenization capability consumed by the pipeline.
///
/// Tokenization rules are deliberately not part of the pipeline's core:
/// corpus statistics, vocabulary building and sequence encoding only need a
/// stream of token strings. Implementations must be deterministic for a
/// given input. Two independently configured tokenizers are typically in
/// play at once: a raw stream for term frequencies and vocabulary counts,
/// and a per-document term set (deduplicated) for document frequencies.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a raw token stream.
    ///
    /// Repeated tokens are preserved. An error marks the document as
    /// unparseable; corpus passes log and skip such documents.
    fn tokens(&self, text: &str) -> Result<Vec<String>>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// The deduplicated per-document term set, for document-frequency
    /// counting. Multiple occurrences within one document count once.
    fn terms(&self, text: &str) -> Result<HashSet<String>> {
        Ok(self.tokens(text)?.into_iter().collect())
    }
}

/// Plain whitespace word tokenizer.
///
/// Splits on whitespace, trims surrounding punctuation from each token and
/// optionally lowercases. This is the raw-stream tokenizer used for term
/// frequencies: every surviving token is kept, repeats included.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    lowercase: bool,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self { lowercase: true }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.lowercase = false;
        self
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WordTokenizer {
    fn tokens(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .split_whitespace()
            .map(|raw| trim_punctuation(raw))
            .filter(|token| !token.is_empty())
            .map(|token| {
                if self.lowercase {
                    token.to_lowercase()
                } else {
                    token.to_string()
                }
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "word"
    }
}

/// Filtering tokenizer for noisy social-media text.
///
/// On top of [`WordTokenizer`]'s splitting it drops URLs, @-handles and
/// number-only tokens, leaving the kind of stream vocabulary building
/// wants. Each filter can be switched off independently.
#[derive(Debug, Clone)]
pub struct FilteringTokenizer {
    lowercase: bool,
    strip_urls: bool,
    strip_mentions: bool,
}

impl FilteringTokenizer {
    pub fn new() -> Self {
        Self {
            lowercase: true,
            strip_urls: true,
            strip_mentions: true,
        }
    }

    pub fn keep_urls(mut self) -> Self {
        self.strip_urls = false;
        self
    }

    pub fn keep_mentions(mut self) -> Self {
        self.strip_mentions = false;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.lowercase = false;
        self
    }

    fn is_url(raw: &str) -> bool {
        let lower = raw.to_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.")
    }
}

impl Default for FilteringTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for FilteringTokenizer {
    fn tokens(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .split_whitespace()
            .filter(|raw| !(self.strip_urls && Self::is_url(raw)))
            .filter(|raw| !(self.strip_mentions && raw.starts_with('@')))
            .map(|raw| trim_punctuation(raw))
            .filter(|token| !token.is_empty())
            .filter(|token| !token.chars().all(|c| c.is_numeric()))
            .map(|token| {
                if self.lowercase {
                    token.to_lowercase()
                } else {
                    token.to_string()
                }
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "filtering"
    }
}

fn trim_punctuation(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}
