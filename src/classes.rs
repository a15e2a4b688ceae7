use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::{PipelineError, Result};

/// A fixed bijection between label strings and integer class indices.
///
/// Established once at training time from the gold labels and persisted;
/// test and predict phases must reuse the same map verbatim so that class
/// indices keep their meaning across the artifact lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMap {
    classes: BTreeMap<String, usize>,
}

impl ClassMap {
    /// Builds the map from an iterator of labels. Duplicates collapse;
    /// indices are assigned 0..n in sorted label order so the assignment
    /// is stable across runs.
    pub fn from_labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let unique: std::collections::BTreeSet<String> =
            labels.into_iter().map(Into::into).collect();
        let classes = unique
            .into_iter()
            .enumerate()
            .map(|(index, label)| (label, index))
            .collect();
        Self { classes }
    }

    /// Builds the map from a training corpus's gold labels.
    ///
    /// # Errors
    /// * `Configuration` if no document carries a gold label.
    pub fn from_corpus(corpus: &Corpus) -> Result<Self> {
        let map = Self::from_labels(
            corpus
                .iter()
                .filter_map(|document| document.gold_label())
                .map(str::to_string),
        );
        if map.is_empty() {
            return Err(PipelineError::Configuration(
                "corpus has no gold labels to build a class map from".into(),
            ));
        }
        Ok(map)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn classes(&self) -> &BTreeMap<String, usize> {
        &self.classes
    }

    /// Derives the index → label inverse, verifying bijectivity.
    ///
    /// # Errors
    /// * `ArtifactMismatch` if two labels share an index (possible only in
    ///   a hand-edited or corrupted persisted map).
    pub fn inverse(&self) -> Result<HashMap<usize, String>> {
        let inverse: HashMap<usize, String> = self
            .classes
            .iter()
            .map(|(label, index)| (*index, label.clone()))
            .collect();
        if inverse.len() != self.classes.len() {
            return Err(PipelineError::ArtifactMismatch {
                what: "distinct class indices".into(),
                expected: self.classes.len(),
                actual: inverse.len(),
            });
        }
        Ok(inverse)
    }
}
