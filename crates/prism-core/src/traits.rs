// crates/prism-core/src/traits.rs

use async_trait::async_trait;

use crate::error::PrismError;

/// Trait for embedding computation backends.
///
/// Implemented by prism-embed (`HashEmbedder`, `HttpEmbedder`).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts. The output must be index-aligned with `texts`
    /// and contain exactly one vector per text; any failure fails the whole
    /// batch with `PrismError::EmbeddingComputation`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError>;

    /// Stable identifier of the embedding model. The embedding cache is
    /// stamped with this value and discarded when it changes.
    fn model_id(&self) -> &str;

    /// Output dimensionality, if known ahead of time.
    fn dimensions(&self) -> Option<usize>;
}
