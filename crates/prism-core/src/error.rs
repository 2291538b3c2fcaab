use thiserror::Error;

/// Error taxonomy for the Prism embedding pipeline.
#[derive(Debug, Error)]
pub enum PrismError {
    /// Persisted embedding cache is missing or corrupt.
    ///
    /// Recovered inside the cache (treated as an empty store); callers of
    /// `EmbeddingCache::load` never see it.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// The embedding backend failed while computing a batch.
    #[error("Embedding computation failed: {0}")]
    EmbeddingComputation(String),

    /// Too few records to build a projection.
    #[error("Insufficient data: need at least {required} responses, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Malformed input (dimension mismatch, misaligned sequences, bad parameters).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for PrismError {
    fn from(e: serde_json::Error) -> Self {
        PrismError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for PrismError {
    fn from(e: std::io::Error) -> Self {
        PrismError::Io(e.to_string())
    }
}
