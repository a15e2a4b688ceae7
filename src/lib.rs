//! A feature extraction and sequence encoding pipeline for short-text
//! classification.
//!
//! Two independent paths run over the same corpus. The classic path
//! derives corpus statistics and turns each document into a sparse
//! feature mapping:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chirp::{Corpus, FeatureKind, FeatureVectorizer, TermStatistics, WordTokenizer};
//!
//! let mut corpus = Corpus::from_labeled(vec![
//!     ("loving the new phone", "positive"),
//!     ("worst commute ever", "negative"),
//!     ("the weather is fine", "positive"),
//! ]);
//!
//! let tokenizer = WordTokenizer::new();
//! let statistics = TermStatistics::build(&mut corpus, &tokenizer, 0)?;
//! let vectorizer = FeatureVectorizer::new(FeatureKind::TfIdf);
//! vectorizer.apply(&mut corpus, &tokenizer, &statistics)?;
//!
//! assert!(corpus.get(0).unwrap().features().is_some());
//! # Ok(())
//! # }
//! ```
//!
//! The neural path builds a vocabulary, aligns it with a pretrained
//! embedding table into a dense weight matrix, and encodes documents as
//! fixed-length index sequences over that matrix:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chirp::{
//!     Corpus, EmbeddingAligner, EmbeddingTable, FilteringTokenizer, SequenceEncoder,
//!     Tokenizer, Vocabulary,
//! };
//!
//! let corpus = Corpus::from_labeled(vec![
//!     ("loving the new phone", "positive"),
//!     ("worst commute ever", "negative"),
//! ]);
//!
//! let tokenizer = FilteringTokenizer::new();
//! let vocab = Vocabulary::build(&corpus, &tokenizer)?;
//! let table = EmbeddingTable::new(16);
//! let alignment = EmbeddingAligner::new(1).with_seed(7).align(&table, &vocab)?;
//!
//! let encoder = SequenceEncoder::new(20);
//! let tokens = tokenizer.tokens("loving the ride home")?;
//! let sequence = encoder.encode(&tokens, alignment.word_index())?;
//! assert_eq!(sequence.len(), 20);
//! # Ok(())
//! # }
//! ```
//!
//! Training-time artifacts (vocabulary, index map, class map, sequence
//! length) are persisted with [`ModelArtifacts`] and reloaded at serving
//! time by a [`Predictor`], which checks them against the external model
//! before any prediction runs.

pub mod artifacts;
pub mod classes;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod features;
pub mod model;
pub mod predict;
pub mod tokenize;

pub use artifacts::ModelArtifacts;
pub use classes::ClassMap;
pub use corpus::{Corpus, Document};
pub use embedding::{
    Alignment, EmbeddingAligner, EmbeddingTable, SequenceEncoder, Vocabulary, PADDING_INDEX,
    UNKNOWN_TOKEN, UNKNOWN_TOKEN_COUNT,
};
pub use error::{PipelineError, Result};
pub use features::{FeatureKind, FeatureVectorizer, TermStatistics, BIAS_FEATURE};
pub use model::{PrototypeModel, SequenceModel};
pub use predict::{convert_corpus, encode_corpus, encode_labels, Predictor};
pub use tokenize::{FilteringTokenizer, Tokenizer, WordTokenizer};

pub fn init_logger() {
    env_logger::init();
}
