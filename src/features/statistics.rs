use std::collections::{HashMap, HashSet};

use log::{info, warn};

use super::BIAS_FEATURE;
use crate::corpus::Corpus;
use crate::error::{PipelineError, Result};
use crate::tokenize::Tokenizer;

/// Corpus-level term statistics: document frequencies reduced to IDF
/// scores, with the most document-frequent terms removed as stopwords.
///
/// Built once from the training corpus and frozen; feature extraction at
/// train and test time reads from the same instance (or a reloaded copy)
/// so that the feature space stays identical.
#[derive(Debug, Clone)]
pub struct TermStatistics {
    corpus_size: usize,
    idf: HashMap<String, f64>,
    stopwords: HashSet<String>,
}

impl TermStatistics {
    /// Scans the corpus once and derives IDF scores.
    ///
    /// Document frequency counts each term once per document (the
    /// tokenizer's deduplicated term set). With a nonzero
    /// `stopword_threshold` k the cutoff is `corpus_size / k`, and terms
    /// are removed in descending DF order while their DF stays at or above
    /// the cutoff; ties at the boundary are removed as a group. A
    /// threshold of 0 disables stopword removal entirely. Surviving terms
    /// get `IDF = log10(corpus_size / df)`, the bias key is added with
    /// value 1, and the resulting term set is published back to the corpus
    /// as its feature-name list (sorted, so the feature dimensionality is
    /// stable across runs).
    ///
    /// Documents the tokenizer rejects are logged and skipped; both the
    /// corpus size and the DF counts reflect exactly the documents that
    /// were processed successfully.
    ///
    /// # Errors
    /// * `EmptyCorpus` if no document could be processed; the cutoff and
    ///   the IDF logarithm both divide by the corpus size, so this fails
    ///   fast instead of producing NaN or infinities.
    pub fn build(
        corpus: &mut Corpus,
        tokenizer: &dyn Tokenizer,
        stopword_threshold: usize,
    ) -> Result<Self> {
        let mut term_dfs: HashMap<String, usize> = HashMap::new();
        let mut corpus_size = 0usize;

        for document in corpus.iter() {
            match tokenizer.terms(document.text()) {
                Ok(terms) => {
                    corpus_size += 1;
                    for term in terms {
                        *term_dfs.entry(term).or_insert(0) += 1;
                    }
                }
                Err(e) => {
                    warn!("Skipping unparseable document: {}", e);
                }
            }
        }

        if corpus_size == 0 {
            return Err(PipelineError::EmptyCorpus(
                "term statistics require at least one parseable document".into(),
            ));
        }

        let mut stopwords = HashSet::new();
        if stopword_threshold != 0 {
            let cutoff = corpus_size as f64 / stopword_threshold as f64;
            let mut sorted_dfs: Vec<(&String, &usize)> = term_dfs.iter().collect();
            // Descending DF, lexicographic within equal DF, so reruns remove
            // the same prefix.
            sorted_dfs.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (term, df) in sorted_dfs {
                if (*df as f64) < cutoff {
                    break;
                }
                stopwords.insert(term.clone());
            }
            for stopword in &stopwords {
                term_dfs.remove(stopword);
            }
        }

        let mut idf: HashMap<String, f64> = term_dfs
            .into_iter()
            .map(|(term, df)| (term, (corpus_size as f64 / df as f64).log10()))
            .collect();
        idf.insert(BIAS_FEATURE.to_string(), 1.0);

        let mut feature_names: Vec<String> = idf.keys().cloned().collect();
        feature_names.sort();
        corpus.set_feature_names(feature_names);

        info!(
            "Built term statistics: {} documents, {} terms, {} stopwords",
            corpus_size,
            idf.len() - 1,
            stopwords.len()
        );

        Ok(Self {
            corpus_size,
            idf,
            stopwords,
        })
    }

    /// Number of documents that contributed to the statistics
    pub fn corpus_size(&self) -> usize {
        self.corpus_size
    }

    /// The term → IDF mapping, bias key included
    pub fn idf(&self) -> &HashMap<String, f64> {
        &self.idf
    }

    pub fn idf_of(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn is_stopword(&self, term: &str) -> bool {
        self.stopwords.contains(term)
    }
}
