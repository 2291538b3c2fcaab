// crates/prism-embed/src/hash.rs
//
// Offline embedder built on `prism_core::hash_embedding`. Useful for local
// runs and tests; vectors are reproducible but carry no semantics beyond
// exact-text identity.

use async_trait::async_trait;

use prism_core::embedding::hash_embedding;
use prism_core::error::PrismError;
use prism_core::traits::Embedder;

/// Deterministic SHA-256 based embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    model_id: String,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            model_id: format!("hash/{}", dimensions),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
        Ok(texts
            .iter()
            .map(|t| hash_embedding(t, self.dimensions))
            .collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }
}
