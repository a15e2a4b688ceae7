use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::info;

use crate::classes::ClassMap;
use crate::embedding::{SequenceEncoder, Vocabulary, PADDING_INDEX};
use crate::error::{PipelineError, Result};

const VOCAB_FILE: &str = "vocab.json";
const MAX_SEQUENCE_LEN_FILE: &str = "max_sequence_len.json";
const WORD_INDEX_FILE: &str = "word_idx_map.json";
const CLASSES_FILE: &str = "classes.json";

/// The vocabulary artifacts persisted alongside a trained model, one
/// directory per model.
///
/// The model architecture and weights themselves are opaque to this crate
/// and live with the external framework; what is persisted here is
/// everything the serving side needs to rebuild the exact input space the
/// model was trained against. Consistency with the model is checked by
/// [`Predictor::new`](crate::Predictor::new) before the model is ever
/// invoked.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    vocab: Vocabulary,
    max_sequence_len: usize,
    word_index: HashMap<String, usize>,
    classes: ClassMap,
}

impl ModelArtifacts {
    /// Assembles and validates a fresh artifact set at training time.
    pub fn new(
        vocab: Vocabulary,
        max_sequence_len: usize,
        word_index: HashMap<String, usize>,
        classes: ClassMap,
    ) -> Result<Self> {
        let artifacts = Self {
            vocab,
            max_sequence_len,
            word_index,
            classes,
        };
        artifacts.validate()?;
        Ok(artifacts)
    }

    /// Writes all artifact files into `dir`, creating it if needed.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        write_json(&dir.join(VOCAB_FILE), &self.vocab)?;
        write_json(&dir.join(MAX_SEQUENCE_LEN_FILE), &self.max_sequence_len)?;
        write_json(&dir.join(WORD_INDEX_FILE), &self.word_index)?;
        write_json(&dir.join(CLASSES_FILE), &self.classes)?;

        info!(
            "Saved artifacts to {:?}: {} vocabulary tokens, {} indexed tokens, {} classes, max_len {}",
            dir,
            self.vocab.len(),
            self.word_index.len(),
            self.classes.len(),
            self.max_sequence_len
        );
        Ok(())
    }

    /// Reads an artifact set back from `dir` and re-validates it.
    ///
    /// # Errors
    /// * `Io` if any of the four files is missing or unreadable
    /// * `ArtifactMismatch` if the reloaded maps are internally
    ///   inconsistent (duplicate rows, the padding row assigned to a
    ///   token, duplicate class indices)
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let vocab: Vocabulary = read_json(&dir.join(VOCAB_FILE))?;
        let max_sequence_len: usize = read_json(&dir.join(MAX_SEQUENCE_LEN_FILE))?;
        let word_index: HashMap<String, usize> = read_json(&dir.join(WORD_INDEX_FILE))?;
        let classes: ClassMap = read_json(&dir.join(CLASSES_FILE))?;

        let artifacts = Self {
            vocab,
            max_sequence_len,
            word_index,
            classes,
        };
        artifacts.validate()?;
        info!("Loaded artifacts from {:?}", dir);
        Ok(artifacts)
    }

    fn validate(&self) -> Result<()> {
        let rows: HashSet<usize> = self.word_index.values().copied().collect();
        if rows.len() != self.word_index.len() {
            return Err(PipelineError::ArtifactMismatch {
                what: "distinct row indices".into(),
                expected: self.word_index.len(),
                actual: rows.len(),
            });
        }
        if rows.contains(&PADDING_INDEX) {
            return Err(PipelineError::ArtifactMismatch {
                what: "minimum row index".into(),
                expected: PADDING_INDEX + 1,
                actual: PADDING_INDEX,
            });
        }
        // Bijectivity of the class map is part of artifact integrity.
        self.classes.inverse()?;
        Ok(())
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn max_sequence_len(&self) -> usize {
        self.max_sequence_len
    }

    pub fn word_index(&self) -> &HashMap<String, usize> {
        &self.word_index
    }

    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }

    /// The encoder matching these artifacts' persisted sequence length
    pub fn encoder(&self) -> SequenceEncoder {
        SequenceEncoder::new(self.max_sequence_len)
    }

    /// Paths of the files `save` produces under `dir`
    pub fn file_paths(dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let dir = dir.as_ref();
        vec![
            dir.join(VOCAB_FILE),
            dir.join(MAX_SEQUENCE_LEN_FILE),
            dir.join(WORD_INDEX_FILE),
            dir.join(CLASSES_FILE),
        ]
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_artifacts() -> ModelArtifacts {
        let mut counts = HashMap::new();
        counts.insert("cat".to_string(), 5u64);
        counts.insert("dog".to_string(), 2u64);
        let vocab = Vocabulary::from_counts(counts);

        let mut word_index = HashMap::new();
        word_index.insert("<UNK>".to_string(), 1usize);
        word_index.insert("cat".to_string(), 2usize);
        word_index.insert("dog".to_string(), 3usize);

        let classes = ClassMap::from_labels(["negative", "positive"]);
        ModelArtifacts::new(vocab, 10, word_index, classes).unwrap()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = sample_artifacts();
        artifacts.save(dir.path()).unwrap();

        for path in ModelArtifacts::file_paths(dir.path()) {
            assert!(path.exists(), "missing {:?}", path);
        }

        let reloaded = ModelArtifacts::load(dir.path()).unwrap();
        assert_eq!(reloaded.max_sequence_len(), 10);
        assert_eq!(reloaded.word_index(), artifacts.word_index());
        assert_eq!(reloaded.vocab().count_of("cat"), 5);
        assert_eq!(reloaded.classes().index_of("positive"), Some(1));
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let mut word_index = HashMap::new();
        word_index.insert("<UNK>".to_string(), 1usize);
        word_index.insert("cat".to_string(), 1usize);
        let result = ModelArtifacts::new(
            Vocabulary::from_counts(HashMap::new()),
            5,
            word_index,
            ClassMap::from_labels(["a"]),
        );
        assert!(matches!(result, Err(PipelineError::ArtifactMismatch { .. })));
    }

    #[test]
    fn test_padding_row_never_assigned() {
        let mut word_index = HashMap::new();
        word_index.insert("cat".to_string(), PADDING_INDEX);
        let result = ModelArtifacts::new(
            Vocabulary::from_counts(HashMap::new()),
            5,
            word_index,
            ClassMap::from_labels(["a"]),
        );
        assert!(matches!(result, Err(PipelineError::ArtifactMismatch { .. })));
    }

    #[test]
    fn test_load_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelArtifacts::load(dir.path().join("absent"));
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }
}
