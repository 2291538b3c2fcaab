// crates/prism-embed/src/resolver.rs
//
// EmbeddingResolver: one vector per input text, computing only cache misses.
//
// Algorithm:
//   1. Fingerprint every text.
//   2. Load the cache snapshot; indices whose fingerprint is present are hits.
//   3. Collect the distinct missing texts (first-occurrence order) and embed
//      them in one batch.
//   4. Every index sharing a missing text receives a clone of the same vector,
//      so repeated texts in one call are bit-identical.
//   5. Merge the new fingerprint -> vector pairs into the cache and rewrite the
//      snapshot before returning.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use prism_core::error::PrismError;
use prism_core::fingerprint::Fingerprint;
use prism_core::traits::Embedder;
use prism_store::EmbeddingCache;

/// Output of a resolve call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// One vector per input text, index-aligned.
    pub vectors: Vec<Vec<f32>>,
    /// Indices served from the persisted cache.
    pub cached_count: usize,
    /// Distinct texts newly computed in this call.
    pub computed_count: usize,
}

/// Cache-aware embedding lookup.
#[derive(Debug)]
pub struct EmbeddingResolver<E: Embedder> {
    cache: EmbeddingCache,
    embedder: E,
}

impl<E: Embedder> EmbeddingResolver<E> {
    /// Create a resolver whose cache is bound to the embedder's model id.
    pub fn new(embedder: E, cache_path: impl Into<PathBuf>) -> Self {
        let cache = EmbeddingCache::new(cache_path, embedder.model_id());
        Self { cache, embedder }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Resolve embeddings for `texts`, index-aligned with the input.
    ///
    /// An empty input returns an empty resolution without touching the cache.
    /// Embedding failures abort the call; nothing is written to the cache in
    /// that case. New entries are persisted before returning, and a failed
    /// rewrite is returned as an error.
    pub async fn resolve(&self, texts: &[String]) -> Result<Resolution, PrismError> {
        if texts.is_empty() {
            return Ok(Resolution::default());
        }

        let mut store = self.cache.load();
        let fingerprints: Vec<Fingerprint> = texts.iter().map(|t| Fingerprint::of(t)).collect();

        let mut slots: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut cached_count = 0;
        let mut pending_texts: Vec<String> = Vec::new();
        let mut pending_fingerprints: Vec<Fingerprint> = Vec::new();
        let mut pending_index: HashMap<Fingerprint, usize> = HashMap::new();

        for (text, fp) in texts.iter().zip(fingerprints.iter()) {
            match self.cache.lookup(&store, fp) {
                Some(entry) => {
                    slots.push(Some(entry.vector.to_vec()));
                    cached_count += 1;
                }
                None => {
                    slots.push(None);
                    if !pending_index.contains_key(fp) {
                        pending_index.insert(fp.clone(), pending_texts.len());
                        pending_texts.push(text.clone());
                        pending_fingerprints.push(fp.clone());
                    }
                }
            }
        }

        let computed_count = pending_texts.len();
        tracing::info!(
            "Resolving {} embeddings: {} cached, {} distinct to compute",
            texts.len(),
            cached_count,
            computed_count
        );

        if computed_count > 0 {
            let computed = self.embedder.embed_batch(&pending_texts).await?;
            check_batch(&computed, computed_count)?;

            for (slot, fp) in slots.iter_mut().zip(fingerprints.iter()) {
                if slot.is_none() {
                    let j = pending_index[fp];
                    *slot = Some(computed[j].clone());
                }
            }

            let new_entries: HashMap<Fingerprint, Vec<f32>> =
                pending_fingerprints.into_iter().zip(computed).collect();
            self.cache.merge_and_persist(&mut store, new_entries)?;
        }

        let vectors = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                PrismError::EmbeddingComputation("Unresolved embedding slot".to_string())
            })?;

        Ok(Resolution {
            vectors,
            cached_count,
            computed_count,
        })
    }
}

/// The backend must return one vector per requested text, all of one width.
fn check_batch(computed: &[Vec<f32>], expected: usize) -> Result<(), PrismError> {
    if computed.len() != expected {
        return Err(PrismError::EmbeddingComputation(format!(
            "Embedder returned {} vectors for {} texts",
            computed.len(),
            expected
        )));
    }
    if let Some(first) = computed.first() {
        let dims = first.len();
        if dims == 0 || computed.iter().any(|v| v.len() != dims) {
            return Err(PrismError::EmbeddingComputation(
                "Embedder returned vectors of inconsistent width".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::hash::HashEmbedder;

    /// Wraps `HashEmbedder` and records how many texts were embedded.
    struct CountingEmbedder {
        inner: HashEmbedder,
        texts_embedded: Arc<AtomicUsize>,
        model_id: String,
    }

    impl CountingEmbedder {
        fn new(model_id: &str) -> (Self, Arc<AtomicUsize>) {
            let counter = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    inner: HashEmbedder::new(16),
                    texts_embedded: counter.clone(),
                    model_id: model_id.to_string(),
                },
                counter,
            )
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
            self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
            self.inner.embed_batch(texts).await
        }

        fn model_id(&self) -> &str {
            &self.model_id
        }

        fn dimensions(&self) -> Option<usize> {
            self.inner.dimensions()
        }
    }

    /// Always fails, to exercise error propagation.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
            Err(PrismError::EmbeddingComputation("model offline".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }

        fn dimensions(&self) -> Option<usize> {
            None
        }
    }

    /// Returns one vector too few.
    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
            Ok(vec![vec![1.0]; texts.len().saturating_sub(1)])
        }

        fn model_id(&self) -> &str {
            "short"
        }

        fn dimensions(&self) -> Option<usize> {
            None
        }
    }

    fn temp_cache_path(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("prism_test_{}_{}", label, Uuid::now_v7()))
            .join("embedding_cache.json")
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_input_touches_nothing() {
        let path = temp_cache_path("empty");
        let (embedder, counter) = CountingEmbedder::new("m");
        let resolver = EmbeddingResolver::new(embedder, &path);

        let res = resolver.resolve(&[]).await.unwrap();
        assert_eq!(res, Resolution::default());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_duplicates_are_computed_once() {
        let (embedder, counter) = CountingEmbedder::new("m");
        let resolver = EmbeddingResolver::new(embedder, temp_cache_path("dedup"));

        let input = texts(&["ok", "fine", "ok", "ok"]);
        let res = resolver.resolve(&input).await.unwrap();

        assert_eq!(res.vectors.len(), 4);
        assert_eq!(res.computed_count, 2);
        assert_eq!(res.cached_count, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(res.vectors[0], res.vectors[2]);
        assert_eq!(res.vectors[0], res.vectors[3]);
        assert_ne!(res.vectors[0], res.vectors[1]);
    }

    #[tokio::test]
    async fn test_warm_cache_is_idempotent() {
        let (embedder, counter) = CountingEmbedder::new("m");
        let resolver = EmbeddingResolver::new(embedder, temp_cache_path("warm"));
        let input = texts(&["alpha", "beta", "gamma"]);

        let first = resolver.resolve(&input).await.unwrap();
        let second = resolver.resolve(&input).await.unwrap();

        assert_eq!(first.computed_count, 3);
        assert_eq!(second.computed_count, 0);
        assert_eq!(second.cached_count, 3);
        assert_eq!(first.vectors, second.vectors);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_partial_hits_compute_only_misses() {
        let path = temp_cache_path("partial");
        let (embedder, counter) = CountingEmbedder::new("m");
        let resolver = EmbeddingResolver::new(embedder, &path);

        resolver.resolve(&texts(&["a", "b"])).await.unwrap();
        let res = resolver.resolve(&texts(&["b", "c", "a", "c"])).await.unwrap();

        assert_eq!(res.cached_count, 2);
        assert_eq!(res.computed_count, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(res.vectors[1], res.vectors[3]);
        assert_eq!(resolver.cache().load().len(), 3);
    }

    #[tokio::test]
    async fn test_cache_shared_across_resolvers_with_same_model() {
        let path = temp_cache_path("shared");
        let (first, _) = CountingEmbedder::new("m");
        EmbeddingResolver::new(first, &path)
            .resolve(&texts(&["x"]))
            .await
            .unwrap();

        let (second, counter) = CountingEmbedder::new("m");
        let res = EmbeddingResolver::new(second, &path)
            .resolve(&texts(&["x"]))
            .await
            .unwrap();
        assert_eq!(res.cached_count, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_change_recomputes_everything() {
        let path = temp_cache_path("modelchange");
        let (old, _) = CountingEmbedder::new("model-a");
        EmbeddingResolver::new(old, &path)
            .resolve(&texts(&["x", "y"]))
            .await
            .unwrap();

        let (new, counter) = CountingEmbedder::new("model-b");
        let resolver = EmbeddingResolver::new(new, &path);
        let res = resolver.resolve(&texts(&["x", "y"])).await.unwrap();
        assert_eq!(res.cached_count, 0);
        assert_eq!(res.computed_count, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cache().load().embedding_model_id, "model-b");
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates_and_writes_nothing() {
        let path = temp_cache_path("failing");
        let resolver = EmbeddingResolver::new(FailingEmbedder, &path);
        let err = resolver.resolve(&texts(&["a"])).await.unwrap_err();
        assert!(matches!(err, PrismError::EmbeddingComputation(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_persist_failure_is_an_error() {
        let dir = std::env::temp_dir().join(format!("prism_test_blocked_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where the cache directory should be.
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let path = blocker.join("embedding_cache.json");

        let (embedder, _) = CountingEmbedder::new("m");
        let resolver = EmbeddingResolver::new(embedder, &path);
        let err = resolver.resolve(&texts(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, PrismError::Io(_)));
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_short_batch_is_rejected() {
        let resolver = EmbeddingResolver::new(ShortEmbedder, temp_cache_path("short"));
        let err = resolver.resolve(&texts(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, PrismError::EmbeddingComputation(_)));
    }
}
