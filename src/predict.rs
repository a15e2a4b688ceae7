use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::artifacts::ModelArtifacts;
use crate::classes::ClassMap;
use crate::corpus::Corpus;
use crate::embedding::SequenceEncoder;
use crate::error::{PipelineError, Result};
use crate::model::SequenceModel;
use crate::tokenize::Tokenizer;

/// Encodes every document of a corpus into the aligned index space,
/// storing each sequence back on its document and returning them in
/// corpus order.
///
/// A document the tokenizer rejects is encoded from an empty token stream
/// (all padding) and logged, rather than skipped: later prediction output
/// is aligned with the corpus by position, so dropping a document here
/// would shift every record after it.
pub fn encode_corpus(
    corpus: &mut Corpus,
    tokenizer: &dyn Tokenizer,
    word_index: &HashMap<String, usize>,
    encoder: &SequenceEncoder,
) -> Result<Vec<Vec<usize>>> {
    let mut sequences = Vec::with_capacity(corpus.len());
    for document in corpus.iter_mut() {
        let tokens = match tokenizer.tokens(document.text()) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Encoding unparseable document as padding: {}", e);
                Vec::new()
            }
        };
        let sequence = encoder.encode(&tokens, word_index)?;
        document.set_sequence(sequence.clone());
        sequences.push(sequence);
    }
    Ok(sequences)
}

/// Maps every document's gold label to its class index, in corpus order.
///
/// # Errors
/// * `Configuration` if a document has no gold label or a label missing
///   from the class map; the class map is fixed at training time and must
///   cover the data verbatim.
pub fn encode_labels(corpus: &Corpus, classes: &ClassMap) -> Result<Vec<usize>> {
    corpus
        .iter()
        .enumerate()
        .map(|(position, document)| {
            let label = document.gold_label().ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "document {} has no gold label",
                    position
                ))
            })?;
            classes.index_of(label).ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "label '{}' is not in the class map",
                    label
                ))
            })
        })
        .collect()
}

/// Encodes a corpus into model input: fixed-length sequences and class
/// indices, both aligned by position. The one-hot expansion of the labels
/// is the external framework's business.
pub fn convert_corpus(
    corpus: &mut Corpus,
    tokenizer: &dyn Tokenizer,
    word_index: &HashMap<String, usize>,
    encoder: &SequenceEncoder,
    classes: &ClassMap,
) -> Result<(Vec<Vec<usize>>, Vec<usize>)> {
    let sequences = encode_corpus(corpus, tokenizer, word_index, encoder)?;
    let labels = encode_labels(corpus, classes)?;
    Ok((sequences, labels))
}

/// The serving side of the artifact lifecycle: reloaded artifacts plus an
/// external model, checked against each other up front.
///
/// Construction fails if the model's expected input geometry disagrees
/// with the persisted artifacts, so a stale artifact directory is caught
/// here and not somewhere inside the framework.
pub struct Predictor<M: SequenceModel> {
    artifacts: ModelArtifacts,
    model: M,
    inverse_classes: HashMap<usize, String>,
    inverse_index: HashMap<usize, String>,
}

impl<M: SequenceModel> Predictor<M> {
    pub fn new(artifacts: ModelArtifacts, model: M) -> Result<Self> {
        if model.input_len() != artifacts.max_sequence_len() {
            return Err(PipelineError::ArtifactMismatch {
                what: "model input length".into(),
                expected: model.input_len(),
                actual: artifacts.max_sequence_len(),
            });
        }
        let expected_rows = artifacts.word_index().len() + 1;
        if model.embedding_rows() != expected_rows {
            return Err(PipelineError::ArtifactMismatch {
                what: "embedding rows".into(),
                expected: model.embedding_rows(),
                actual: expected_rows,
            });
        }

        let inverse_classes = artifacts.classes().inverse()?;
        let inverse_index: HashMap<usize, String> = artifacts
            .word_index()
            .iter()
            .map(|(token, row)| (*row, token.clone()))
            .collect();

        Ok(Self {
            artifacts,
            model,
            inverse_classes,
            inverse_index,
        })
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Predicts a label for every document, writing predictions back onto
    /// the corpus in order, and returns the labels.
    pub fn predict_corpus(
        &self,
        corpus: &mut Corpus,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Vec<String>> {
        let encoder = self.artifacts.encoder();
        let sequences = encode_corpus(corpus, tokenizer, self.artifacts.word_index(), &encoder)?;
        let indices = self.model.predict(&sequences)?;
        if indices.len() != sequences.len() {
            return Err(PipelineError::ArtifactMismatch {
                what: "predictions".into(),
                expected: sequences.len(),
                actual: indices.len(),
            });
        }

        let mut labels = Vec::with_capacity(indices.len());
        for &index in &indices {
            let label = self.inverse_classes.get(&index).ok_or_else(|| {
                PipelineError::ArtifactMismatch {
                    what: "class indices".into(),
                    expected: self.artifacts.classes().len(),
                    actual: index,
                }
            })?;
            labels.push(label.clone());
        }

        for (document, label) in corpus.iter_mut().zip(&labels) {
            document.set_pred_label(label.clone());
        }

        info!("Predicted {} documents", labels.len());
        Ok(labels)
    }

    /// Writes one record per document: the predicted label, a tab, and
    /// the space-joined reconstruction of the encoded sequence through the
    /// inverse index map. Indices absent from the map (padding above all)
    /// render as the empty string.
    ///
    /// # Errors
    /// * `Configuration` if a document has not been through
    ///   [`predict_corpus`](Self::predict_corpus) first.
    pub fn write_predictions(&self, corpus: &Corpus, writer: &mut impl Write) -> Result<()> {
        for (position, document) in corpus.iter().enumerate() {
            let label = document.pred_label().ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "document {} has no predicted label; run predict_corpus first",
                    position
                ))
            })?;
            let sequence = document.sequence().ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "document {} has no encoded sequence; run predict_corpus first",
                    position
                ))
            })?;
            let text = sequence
                .iter()
                .map(|index| {
                    self.inverse_index
                        .get(index)
                        .map(String::as_str)
                        .unwrap_or("")
                })
                .collect::<Vec<&str>>()
                .join(" ");
            writeln!(writer, "{}\t{}", label, text)?;
        }
        Ok(())
    }

    /// [`write_predictions`](Self::write_predictions) into a file
    pub fn save_predictions(&self, corpus: &Corpus, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_predictions(corpus, &mut writer)?;
        writer.flush()?;
        info!("Wrote predictions to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::embedding::{Vocabulary, UNKNOWN_TOKEN};
    use crate::tokenize::WordTokenizer;
    use std::collections::HashMap;

    struct FixedModel {
        input_len: usize,
        rows: usize,
        answers: Vec<usize>,
    }

    impl SequenceModel for FixedModel {
        fn input_len(&self) -> usize {
            self.input_len
        }

        fn embedding_rows(&self) -> usize {
            self.rows
        }

        fn predict(&self, sequences: &[Vec<usize>]) -> Result<Vec<usize>> {
            Ok(sequences
                .iter()
                .enumerate()
                .map(|(i, _)| self.answers[i % self.answers.len()])
                .collect())
        }
    }

    fn sample_artifacts(max_len: usize) -> ModelArtifacts {
        let mut counts = HashMap::new();
        counts.insert("cat".to_string(), 5u64);
        let vocab = Vocabulary::from_counts(counts);

        let mut word_index = HashMap::new();
        word_index.insert(UNKNOWN_TOKEN.to_string(), 1usize);
        word_index.insert("cat".to_string(), 2usize);
        word_index.insert("dog".to_string(), 3usize);

        let classes = ClassMap::from_labels(["negative", "positive"]);
        ModelArtifacts::new(vocab, max_len, word_index, classes).unwrap()
    }

    #[test]
    fn test_dimension_checks_run_before_the_model() {
        let artifacts = sample_artifacts(4);
        // Wrong input length.
        let result = Predictor::new(
            artifacts.clone(),
            FixedModel {
                input_len: 8,
                rows: 4,
                answers: vec![0],
            },
        );
        assert!(matches!(result, Err(PipelineError::ArtifactMismatch { .. })));

        // Wrong embedding row count.
        let result = Predictor::new(
            artifacts,
            FixedModel {
                input_len: 4,
                rows: 10,
                answers: vec![0],
            },
        );
        assert!(matches!(result, Err(PipelineError::ArtifactMismatch { .. })));
    }

    #[test]
    fn test_predict_corpus_sets_labels_in_order() {
        let artifacts = sample_artifacts(4);
        let predictor = Predictor::new(
            artifacts,
            FixedModel {
                input_len: 4,
                rows: 4,
                answers: vec![1, 0],
            },
        )
        .unwrap();

        let mut corpus = Corpus::new();
        corpus.push(Document::new("cat dog"));
        corpus.push(Document::new("dog dog"));
        let labels = predictor
            .predict_corpus(&mut corpus, &WordTokenizer::new())
            .unwrap();
        assert_eq!(labels, vec!["positive", "negative"]);
        assert_eq!(corpus.get(0).unwrap().pred_label(), Some("positive"));
        assert_eq!(corpus.get(1).unwrap().pred_label(), Some("negative"));
    }

    #[test]
    fn test_predictions_file_format() {
        let artifacts = sample_artifacts(4);
        let predictor = Predictor::new(
            artifacts,
            FixedModel {
                input_len: 4,
                rows: 4,
                answers: vec![1],
            },
        )
        .unwrap();

        let mut corpus = Corpus::new();
        corpus.push(Document::new("cat wolf"));
        predictor
            .predict_corpus(&mut corpus, &WordTokenizer::new())
            .unwrap();

        let mut output = Vec::new();
        predictor.write_predictions(&corpus, &mut output).unwrap();
        let line = String::from_utf8(output).unwrap();
        // Sequence [0, 0, 2, 1]: padding renders empty, wolf fell back to
        // the <UNK> row.
        assert_eq!(line, format!("positive\t  cat {}\n", UNKNOWN_TOKEN));
    }

    #[test]
    fn test_encode_labels_requires_known_labels() {
        let classes = ClassMap::from_labels(["a"]);
        let mut corpus = Corpus::new();
        corpus.push(Document::labeled("text", "b"));
        assert!(matches!(
            encode_labels(&corpus, &classes),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_convert_corpus_aligns_sequences_and_labels() {
        let artifacts = sample_artifacts(3);
        let classes = ClassMap::from_labels(["x", "y"]);
        let mut corpus = Corpus::new();
        corpus.push(Document::labeled("cat", "y"));
        corpus.push(Document::labeled("dog cat", "x"));
        let encoder = artifacts.encoder();
        let (sequences, labels) = convert_corpus(
            &mut corpus,
            &WordTokenizer::new(),
            artifacts.word_index(),
            &encoder,
            &classes,
        )
        .unwrap();
        assert_eq!(sequences, vec![vec![0, 0, 2], vec![0, 3, 2]]);
        assert_eq!(labels, vec![1, 0]);
        assert_eq!(corpus.get(0).unwrap().sequence(), Some(&[0, 0, 2][..]));
    }
}
