use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single short-text record flowing through the pipeline.
///
/// A document starts out as raw text plus an optional gold label; the later
/// pipeline stages assign the remaining fields (a feature mapping after
/// vectorization, an integer sequence after encoding, a predicted label
/// after model evaluation). Documents are owned exclusively by their
/// [`Corpus`] and are never shared between corpora.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    text: String,
    gold_label: Option<String>,
    pred_label: Option<String>,
    features: Option<HashMap<String, f64>>,
    sequence: Option<Vec<usize>>,
}

impl Document {
    /// Creates an unlabeled document from raw text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Creates a document with a gold label, as read from a training corpus
    pub fn labeled(text: impl Into<String>, gold_label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            gold_label: Some(gold_label.into()),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn gold_label(&self) -> Option<&str> {
        self.gold_label.as_deref()
    }

    pub fn pred_label(&self) -> Option<&str> {
        self.pred_label.as_deref()
    }

    pub fn set_pred_label(&mut self, label: impl Into<String>) {
        self.pred_label = Some(label.into());
    }

    pub fn features(&self) -> Option<&HashMap<String, f64>> {
        self.features.as_ref()
    }

    pub fn set_features(&mut self, features: HashMap<String, f64>) {
        self.features = Some(features);
    }

    pub fn sequence(&self) -> Option<&[usize]> {
        self.sequence.as_deref()
    }

    pub fn set_sequence(&mut self, sequence: Vec<usize>) {
        self.sequence = Some(sequence);
    }
}

/// An ordered collection of documents.
///
/// Order is significant for prediction-output alignment: predictions are
/// written back onto documents by position. The corpus also carries the
/// feature-name list published by term statistics, so that consumers that
/// need a fixed feature dimensionality can read it before any document is
/// vectorized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<Document>,
    feature_names: Vec<String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a corpus of labeled documents from (text, label) pairs
    pub fn from_labeled<T, L>(records: impl IntoIterator<Item = (T, L)>) -> Self
    where
        T: Into<String>,
        L: Into<String>,
    {
        Self {
            documents: records
                .into_iter()
                .map(|(text, label)| Document::labeled(text, label))
                .collect(),
            feature_names: Vec::new(),
        }
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Document> {
        self.documents.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    /// The feature-name list published by term statistics.
    ///
    /// Empty until [`TermStatistics::build`](crate::TermStatistics::build)
    /// has run against this corpus.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn set_feature_names(&mut self, names: Vec<String>) {
        self.feature_names = names;
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut Corpus {
    type Item = &'a mut Document;
    type IntoIter = std::slice::IterMut<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lifecycle() {
        let mut doc = Document::labeled("some text", "positive");
        assert_eq!(doc.text(), "some text");
        assert_eq!(doc.gold_label(), Some("positive"));
        assert!(doc.pred_label().is_none());
        assert!(doc.features().is_none());
        assert!(doc.sequence().is_none());

        doc.set_pred_label("negative");
        doc.set_sequence(vec![0, 0, 3]);
        assert_eq!(doc.pred_label(), Some("negative"));
        assert_eq!(doc.sequence(), Some(&[0, 0, 3][..]));
    }

    #[test]
    fn test_corpus_preserves_order() {
        let corpus = Corpus::from_labeled(vec![("first", "a"), ("second", "b"), ("third", "a")]);
        assert_eq!(corpus.len(), 3);
        let texts: Vec<&str> = corpus.iter().map(|d| d.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_feature_names_start_empty() {
        let corpus = Corpus::new();
        assert!(corpus.is_empty());
        assert!(corpus.feature_names().is_empty());
    }
}
