use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use super::vocab::Vocabulary;
use crate::error::{PipelineError, Result};

/// A pretrained token → vector table with a declared dimensionality.
///
/// Immutable once loaded: the aligner reads vectors out of it but never
/// writes back. Loading can be pre-filtered by a vocabulary to keep memory
/// bounded on large embedding files; filtering changes the input size
/// only, never the alignment outcome for tokens that survive it.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Adds a vector during table construction.
    ///
    /// # Errors
    /// * `EmbeddingTable` if the vector's length differs from the declared
    ///   dimensionality.
    pub fn insert(&mut self, token: impl Into<String>, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(PipelineError::EmbeddingTable(format!(
                "vector has {} dimensions, table declares {}",
                vector.len(),
                self.dimension
            )));
        }
        self.vectors.insert(token.into(), vector);
        Ok(())
    }

    /// Loads a word2vec-style text file: an optional `count dimension`
    /// header line followed by `token v1 .. vd` rows.
    ///
    /// With a `filter` vocabulary, rows whose token is not in the
    /// vocabulary are discarded while reading.
    pub fn from_text_file(path: impl AsRef<Path>, filter: Option<&Vocabulary>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::EmbeddingTable(format!(
                "embedding file not found: {}",
                path.display()
            )));
        }

        let reader = BufReader::new(File::open(path)?);
        let mut dimension = 0usize;
        let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
        let mut skipped = 0usize;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let first = match parts.next() {
                Some(first) => first,
                None => continue,
            };
            let rest: Vec<&str> = parts.collect();

            // A two-integer first line is the word2vec header.
            if line_number == 0 && rest.len() == 1 {
                if let (Ok(_count), Ok(dim)) = (first.parse::<usize>(), rest[0].parse::<usize>()) {
                    dimension = dim;
                    continue;
                }
            }

            if let Some(vocab) = filter {
                if !vocab.contains(first) {
                    skipped += 1;
                    continue;
                }
            }

            let vector: Vec<f32> = rest
                .iter()
                .map(|value| {
                    value.parse::<f32>().map_err(|_| {
                        PipelineError::EmbeddingTable(format!(
                            "line {}: unparseable component '{}'",
                            line_number + 1,
                            value
                        ))
                    })
                })
                .collect::<Result<_>>()?;

            if dimension == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(PipelineError::EmbeddingTable(format!(
                    "line {}: vector has {} dimensions, expected {}",
                    line_number + 1,
                    vector.len(),
                    dimension
                )));
            }
            vectors.insert(first.to_string(), vector);
        }

        if dimension == 0 {
            return Err(PipelineError::EmbeddingTable(format!(
                "no vectors found in {}",
                path.display()
            )));
        }

        info!(
            "Loaded {} pretrained vectors (dimension {}, {} filtered out)",
            vectors.len(),
            dimension,
            skipped
        );
        Ok(Self { dimension, vectors })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vectors.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<f32>)> {
        self.vectors.iter()
    }
}
