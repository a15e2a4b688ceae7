use std::collections::HashMap;

use log::info;
use ndarray::{Array1, Array2};

use crate::error::{PipelineError, Result};

/// The external deep-learning framework seam.
///
/// The pipeline never inspects a model beyond this trait: the expected
/// input geometry (so artifacts can be checked against it before any
/// prediction) and batch prediction over encoded sequences. Recurrent and
/// convolutional trainers live entirely on the other side of this
/// boundary.
pub trait SequenceModel: Send + Sync {
    /// The fixed sequence length the model was built for
    fn input_len(&self) -> usize;

    /// Number of rows in the embedding matrix the model was built with,
    /// padding row included
    fn embedding_rows(&self) -> usize;

    /// Predicts one class index per encoded sequence
    fn predict(&self, sequences: &[Vec<usize>]) -> Result<Vec<usize>>;
}

/// A similarity baseline over the aligned embedding space.
///
/// Each class gets a prototype: the normalized average of the embedded
/// training sequences that carry its label (a sequence embeds as the mean
/// of its non-padding rows). Prediction scores a sequence against every
/// prototype by dot product and takes the best. No gradients, no external
/// framework; this keeps the [`SequenceModel`] seam exercised end to end
/// and gives experiments a floor to beat.
#[derive(Debug, Clone)]
pub struct PrototypeModel {
    weights: Array2<f32>,
    input_len: usize,
    prototypes: Vec<(usize, Array1<f32>)>,
}

impl PrototypeModel {
    /// Builds prototypes from encoded training sequences and their class
    /// indices.
    ///
    /// # Errors
    /// * `Configuration` if sequences and labels differ in length
    /// * `EmptyCorpus` if there are no training sequences
    /// * `ArtifactMismatch` if any sequence index falls outside the matrix
    pub fn train(
        weights: Array2<f32>,
        input_len: usize,
        sequences: &[Vec<usize>],
        class_indices: &[usize],
    ) -> Result<Self> {
        if sequences.len() != class_indices.len() {
            return Err(PipelineError::Configuration(format!(
                "{} sequences but {} class labels",
                sequences.len(),
                class_indices.len()
            )));
        }
        if sequences.is_empty() {
            return Err(PipelineError::EmptyCorpus(
                "prototype training requires at least one sequence".into(),
            ));
        }

        let dimension = weights.ncols();
        let mut class_vectors: HashMap<usize, Vec<Array1<f32>>> = HashMap::new();
        for (sequence, class) in sequences.iter().zip(class_indices) {
            let vector = sequence_vector(&weights, sequence)?;
            class_vectors.entry(*class).or_default().push(vector);
        }

        let mut prototypes: Vec<(usize, Array1<f32>)> = class_vectors
            .into_iter()
            .map(|(class, vectors)| (class, normalize(&average(&vectors, dimension))))
            .collect();
        prototypes.sort_by_key(|(class, _)| *class);

        info!(
            "Trained prototype model: {} classes over {} sequences",
            prototypes.len(),
            sequences.len()
        );

        Ok(Self {
            weights,
            input_len,
            prototypes,
        })
    }
}

impl SequenceModel for PrototypeModel {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn embedding_rows(&self) -> usize {
        self.weights.nrows()
    }

    fn predict(&self, sequences: &[Vec<usize>]) -> Result<Vec<usize>> {
        sequences
            .iter()
            .map(|sequence| {
                let vector = normalize(&sequence_vector(&self.weights, sequence)?);
                let best = self
                    .prototypes
                    .iter()
                    .max_by(|a, b| {
                        let score_a = vector.dot(&a.1);
                        let score_b = vector.dot(&b.1);
                        score_a
                            .partial_cmp(&score_b)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(class, _)| *class)
                    .ok_or_else(|| {
                        PipelineError::Configuration("model has no prototypes".into())
                    })?;
                Ok(best)
            })
            .collect()
    }
}

/// Mean of the sequence's non-padding embedding rows; zero when the
/// sequence is nothing but padding.
fn sequence_vector(weights: &Array2<f32>, sequence: &[usize]) -> Result<Array1<f32>> {
    let dimension = weights.ncols();
    let mut sum = Array1::<f32>::zeros(dimension);
    let mut count = 0usize;
    for &index in sequence {
        if index == 0 {
            continue;
        }
        if index >= weights.nrows() {
            return Err(PipelineError::ArtifactMismatch {
                what: "embedding rows".into(),
                expected: weights.nrows(),
                actual: index + 1,
            });
        }
        sum += &weights.row(index);
        count += 1;
    }
    if count > 0 {
        sum /= count as f32;
    }
    Ok(sum)
}

fn normalize(vector: &Array1<f32>) -> Array1<f32> {
    let norm: f32 = vector.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if norm > 1e-10 {
        vector / norm
    } else {
        Array1::zeros(vector.len())
    }
}

fn average(vectors: &[Array1<f32>], dimension: usize) -> Array1<f32> {
    if vectors.is_empty() {
        return Array1::zeros(dimension);
    }
    let sum = vectors
        .iter()
        .fold(Array1::zeros(dimension), |acc, v| acc + v);
    sum / vectors.len() as f32
}
