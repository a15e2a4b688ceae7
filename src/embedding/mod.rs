//! The neural-input path: vocabulary counts merged with pretrained
//! embeddings into an aligned index space, and token streams encoded into
//! fixed-length integer sequences over that space.

mod aligner;
mod encoder;
mod table;
mod vocab;

pub use aligner::{Alignment, EmbeddingAligner, PADDING_INDEX};
pub use encoder::SequenceEncoder;
pub use table::EmbeddingTable;
pub use vocab::{Vocabulary, UNKNOWN_TOKEN, UNKNOWN_TOKEN_COUNT};
