use std::io;

/// Represents the different types of errors that can occur in the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing or invalid required parameter detected at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Corpus size is zero where a divisor depends on it
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),
    /// The out-of-vocabulary sentinel is missing from an index map at encode time
    #[error("Unknown-token map state: {0}")]
    UnknownTokenState(String),
    /// Persisted artifacts are inconsistent with the model's expected dimensions
    #[error("Artifact mismatch: expected {expected} {what}, got {actual}")]
    ArtifactMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    /// Error produced by a tokenizer implementation
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
    /// Malformed or unreadable pretrained embedding table
    #[error("Embedding table error: {0}")]
    EmbeddingTable(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
