use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use super::statistics::TermStatistics;
use super::BIAS_FEATURE;
use crate::corpus::Corpus;
use crate::error::{PipelineError, Result};
use crate::tokenize::Tokenizer;

/// The recognized feature schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// 1 for every term present in the document
    Binary,
    /// Raw occurrence count
    Count,
    /// Occurrence count normalized by the document's token count
    Frequency,
    /// Normalized frequency weighted by the term's IDF score
    TfIdf,
}

impl FromStr for FeatureKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" => Ok(Self::Binary),
            "count" => Ok(Self::Count),
            "frequency" => Ok(Self::Frequency),
            "tf-idf" => Ok(Self::TfIdf),
            other => Err(PipelineError::Configuration(format!(
                "unrecognized feature kind '{}' (expected one of: binary, count, frequency, tf-idf)",
                other
            ))),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Binary => "binary",
            Self::Count => "count",
            Self::Frequency => "frequency",
            Self::TfIdf => "tf-idf",
        };
        write!(f, "{}", name)
    }
}

/// Converts a single document's token stream into a sparse feature mapping.
///
/// Only terms present in the IDF map contribute an entry; everything else
/// is dropped silently. Term frequency counts repeats (unlike document
/// frequency) and is normalized by the document's full token count,
/// including tokens absent from the IDF map. That denominator is a
/// deliberate part of the contract, not an accident of filtering.
#[derive(Debug, Clone)]
pub struct FeatureVectorizer {
    kind: FeatureKind,
}

impl FeatureVectorizer {
    pub fn new(kind: FeatureKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Vectorizes one document.
    ///
    /// Pure apart from tokenization: the result depends only on the text,
    /// the tokenizer and the statistics. The bias feature is applied last
    /// and always has value 1, even if a corpus term shares its key.
    pub fn vectorize(
        &self,
        text: &str,
        tokenizer: &dyn Tokenizer,
        statistics: &TermStatistics,
    ) -> Result<HashMap<String, f64>> {
        let tokens = tokenizer.tokens(text)?;
        let total = tokens.len();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            if statistics.idf().contains_key(&token) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut features: HashMap<String, f64> = HashMap::with_capacity(counts.len() + 1);
        for (term, count) in counts {
            let tf = count as f64 / total as f64;
            let value = match self.kind {
                FeatureKind::Binary => 1.0,
                FeatureKind::Count => count as f64,
                FeatureKind::Frequency => tf,
                FeatureKind::TfIdf => tf * statistics.idf_of(&term).unwrap_or(0.0),
            };
            features.insert(term, value);
        }

        features.insert(BIAS_FEATURE.to_string(), 1.0);
        Ok(features)
    }

    /// Vectorizes every document in the corpus and assigns the result back
    /// onto each document. Documents the tokenizer rejects keep their
    /// previous (usually absent) feature mapping and are logged.
    pub fn apply(
        &self,
        corpus: &mut Corpus,
        tokenizer: &dyn Tokenizer,
        statistics: &TermStatistics,
    ) -> Result<()> {
        let mut assigned = 0usize;
        for document in corpus.iter_mut() {
            match self.vectorize(document.text(), tokenizer, statistics) {
                Ok(features) => {
                    document.set_features(features);
                    assigned += 1;
                }
                Err(PipelineError::Tokenizer(e)) => {
                    warn!("Skipping unvectorizable document: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        info!("Assigned {} feature vectors ({})", assigned, self.kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::tokenize::WordTokenizer;

    fn stats_for(texts: &[&str]) -> (Corpus, TermStatistics) {
        let mut corpus = Corpus::new();
        for text in texts {
            corpus.push(Document::new(*text));
        }
        let stats = TermStatistics::build(&mut corpus, &WordTokenizer::new(), 0).unwrap();
        (corpus, stats)
    }

    #[test]
    fn test_feature_kind_parsing() {
        assert_eq!("tf-idf".parse::<FeatureKind>().unwrap(), FeatureKind::TfIdf);
        assert_eq!("binary".parse::<FeatureKind>().unwrap(), FeatureKind::Binary);
        let err = "n-gram".parse::<FeatureKind>();
        assert!(matches!(err, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_tf_normalizes_by_full_token_count() {
        let (_, stats) = stats_for(&["cat dog", "cat bird"]);
        let vectorizer = FeatureVectorizer::new(FeatureKind::Frequency);
        // "wolf" is out of vocabulary but still counts toward the
        // denominator: tf("cat") = 1/3, not 1/2.
        let features = vectorizer
            .vectorize("cat dog wolf", &WordTokenizer::new(), &stats)
            .unwrap();
        assert!((features["cat"] - 1.0 / 3.0).abs() < 1e-12);
        assert!(!features.contains_key("wolf"));
    }

    #[test]
    fn test_tfidf_values() {
        let (_, stats) = stats_for(&["cat dog", "cat bird"]);
        let vectorizer = FeatureVectorizer::new(FeatureKind::TfIdf);
        let features = vectorizer
            .vectorize("dog dog cat", &WordTokenizer::new(), &stats)
            .unwrap();
        // tf(dog) = 2/3, idf(dog) = log10(2/1)
        let expected_dog = 2.0 / 3.0 * 2.0f64.log10();
        assert!((features["dog"] - expected_dog).abs() < 1e-12);
        // tf(cat) = 1/3, idf(cat) = log10(2/2) = 0
        assert!((features["cat"] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_bias_always_one() {
        let (_, stats) = stats_for(&["cat dog", "cat bird"]);
        for kind in [
            FeatureKind::Binary,
            FeatureKind::Count,
            FeatureKind::Frequency,
            FeatureKind::TfIdf,
        ] {
            let features = FeatureVectorizer::new(kind)
                .vectorize("cat cat dog", &WordTokenizer::new(), &stats)
                .unwrap();
            assert_eq!(features[BIAS_FEATURE], 1.0, "kind {}", kind);
        }
    }

    #[test]
    fn test_empty_document_gets_only_bias() {
        let (_, stats) = stats_for(&["cat dog"]);
        let features = FeatureVectorizer::new(FeatureKind::TfIdf)
            .vectorize("", &WordTokenizer::new(), &stats)
            .unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[BIAS_FEATURE], 1.0);
    }

    #[test]
    fn test_binary_and_count_kinds() {
        let (_, stats) = stats_for(&["cat dog", "cat bird"]);
        let binary = FeatureVectorizer::new(FeatureKind::Binary)
            .vectorize("cat cat dog", &WordTokenizer::new(), &stats)
            .unwrap();
        assert_eq!(binary["cat"], 1.0);
        let count = FeatureVectorizer::new(FeatureKind::Count)
            .vectorize("cat cat dog", &WordTokenizer::new(), &stats)
            .unwrap();
        assert_eq!(count["cat"], 2.0);
        assert_eq!(count["dog"], 1.0);
    }

    #[test]
    fn test_apply_assigns_features_to_documents() {
        let (mut corpus, stats) = stats_for(&["cat dog", "cat bird"]);
        let vectorizer = FeatureVectorizer::new(FeatureKind::TfIdf);
        vectorizer
            .apply(&mut corpus, &WordTokenizer::new(), &stats)
            .unwrap();
        for document in corpus.iter() {
            let features = document.features().expect("features assigned");
            assert_eq!(features[BIAS_FEATURE], 1.0);
        }
    }
}
