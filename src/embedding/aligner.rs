use std::collections::{BTreeMap, HashMap};

use log::info;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::table::EmbeddingTable;
use super::vocab::Vocabulary;
use crate::error::{PipelineError, Result};

/// Row index reserved for padding. Never assigned to a token; the matrix
/// row it names is all zero.
pub const PADDING_INDEX: usize = 0;

/// Merges a pretrained embedding table with a corpus vocabulary into a
/// dense weight matrix and a token → row index map.
///
/// Survivors are the union of every pretrained token and every vocabulary
/// token whose count reaches `min_count`; pretrained vectors are copied
/// verbatim, the rest are drawn uniformly from [-0.25, 0.25). Tokens below
/// `min_count` without a pretrained vector are dropped entirely; sequences
/// containing them later fall back to the out-of-vocabulary row.
///
/// Alignment is reproducible: enumeration is lexicographic over both
/// inputs and the random draws come from a seeded generator, so a fixed
/// (table, vocabulary, min_count, seed) quadruple always yields the same
/// matrix and index map.
#[derive(Debug, Clone)]
pub struct EmbeddingAligner {
    min_count: u64,
    seed: u64,
}

impl EmbeddingAligner {
    pub fn new(min_count: u64) -> Self {
        Self { min_count, seed: 0 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Produces the aligned weight matrix and index map.
    ///
    /// # Errors
    /// * `Configuration` if the table declares a zero dimensionality.
    pub fn align(&self, table: &EmbeddingTable, vocab: &Vocabulary) -> Result<Alignment> {
        let dimension = table.dimension();
        if dimension == 0 {
            return Err(PipelineError::Configuration(
                "embedding table declares a zero dimensionality".into(),
            ));
        }

        // Pretrained vectors first, copied verbatim. The BTreeMap keeps
        // enumeration lexicographic from here on.
        let mut embeddings: BTreeMap<String, Vec<f32>> = table
            .iter()
            .map(|(token, vector)| (token.clone(), vector.clone()))
            .collect();

        let mut fresh: Vec<&String> = vocab
            .counts()
            .iter()
            .filter(|(token, count)| **count >= self.min_count && !embeddings.contains_key(*token))
            .map(|(token, _)| token)
            .collect();
        fresh.sort();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let fresh_count = fresh.len();
        for token in fresh {
            let vector: Vec<f32> = (0..dimension)
                .map(|_| rng.random_range(-0.25f32..0.25f32))
                .collect();
            embeddings.insert(token.clone(), vector);
        }

        let mut weights = Array2::<f32>::zeros((embeddings.len() + 1, dimension));
        let mut word_index: HashMap<String, usize> = HashMap::with_capacity(embeddings.len());
        for (i, (token, vector)) in embeddings.iter().enumerate() {
            let row = i + 1;
            weights.row_mut(row).assign(&ArrayView1::from(&vector[..]));
            word_index.insert(token.clone(), row);
        }

        let dropped = vocab
            .counts()
            .keys()
            .filter(|token| !word_index.contains_key(*token))
            .count();
        info!(
            "Aligned embeddings: {} pretrained, {} randomly initialized, {} dropped below min_count {}",
            table.len(),
            fresh_count,
            dropped,
            self.min_count
        );

        Ok(Alignment {
            embeddings,
            weights,
            word_index,
        })
    }
}

/// The output of [`EmbeddingAligner::align`]: survivor vectors, the dense
/// weight matrix with its reserved zero row, and the row assignment.
#[derive(Debug, Clone)]
pub struct Alignment {
    embeddings: BTreeMap<String, Vec<f32>>,
    weights: Array2<f32>,
    word_index: HashMap<String, usize>,
}

impl Alignment {
    /// Survivor token → vector map, lexicographically ordered
    pub fn embeddings(&self) -> &BTreeMap<String, Vec<f32>> {
        &self.embeddings
    }

    /// The `(1 + survivors) × dimension` weight matrix; row 0 is all zero
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Token → row index, bijective on survivors; no token maps to row 0
    pub fn word_index(&self) -> &HashMap<String, usize> {
        &self.word_index
    }

    pub fn dimension(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of survivor tokens (excludes the padding row)
    pub fn vocab_size(&self) -> usize {
        self.word_index.len()
    }

    pub fn row_of(&self, token: &str) -> Option<usize> {
        self.word_index.get(token).copied()
    }

    pub fn vector_of(&self, token: &str) -> Option<ArrayView1<'_, f32>> {
        self.row_of(token).map(|row| self.weights.row(row))
    }

    /// Consumes the alignment, handing the matrix and index map to the
    /// caller (typically the external model builder and the artifact
    /// writer respectively)
    pub fn into_parts(self) -> (BTreeMap<String, Vec<f32>>, Array2<f32>, HashMap<String, usize>) {
        (self.embeddings, self.weights, self.word_index)
    }
}
