// crates/prism-embed/src/http.rs
//
// Client for OpenAI-compatible embedding endpoints:
//
//   POST {api_url}/embeddings
//   { "model": "...", "input": ["text", ...] }
//   -> { "data": [{ "index": 0, "embedding": [f32, ...] }, ...] }
//
// Texts are sent in chunks of `batch_size`. Failures are not retried: any
// transport, status, or shape error fails the whole batch, since a partial
// result would break index alignment.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use prism_core::error::PrismError;
use prism_core::traits::Embedder;

/// Connection settings for an HTTP embedding backend.
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// Base URL, e.g. "https://api.openai.com/v1".
    pub api_url: String,
    /// Model name sent with every request; also the cache model id.
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Texts per request.
    pub batch_size: usize,
    /// Expected output dimensionality, if known.
    pub dimensions: Option<usize>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpEmbedderConfig {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            model: model.into(),
            api_key: None,
            batch_size: 32,
            dimensions: None,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by a remote OpenAI-compatible embeddings API.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    config: HttpEmbedderConfig,
    client: reqwest::Client,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, PrismError> {
        if config.batch_size == 0 {
            return Err(PrismError::Config(
                "Embedding batch_size must be at least 1".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PrismError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.api_url.trim_end_matches('/'))
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: chunk,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| PrismError::EmbeddingComputation(format!("Request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PrismError::EmbeddingComputation(format!(
                "Embedding endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = resp.json().await.map_err(|e| {
            PrismError::EmbeddingComputation(format!("Malformed embedding response: {}", e))
        })?;

        order_by_index(parsed, chunk.len(), self.config.dimensions)
    }
}

/// Reorder response data by `index`, checking that every input got exactly
/// one vector of the expected width.
fn order_by_index(
    response: EmbeddingResponse,
    expected: usize,
    dimensions: Option<usize>,
) -> Result<Vec<Vec<f32>>, PrismError> {
    if response.data.len() != expected {
        return Err(PrismError::EmbeddingComputation(format!(
            "Expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for datum in response.data {
        if let Some(dims) = dimensions {
            if datum.embedding.len() != dims {
                return Err(PrismError::EmbeddingComputation(format!(
                    "Embedding {} has {} dimensions, expected {}",
                    datum.index,
                    datum.embedding.len(),
                    dims
                )));
            }
        }
        let slot = slots.get_mut(datum.index).ok_or_else(|| {
            PrismError::EmbeddingComputation(format!(
                "Embedding index {} out of range",
                datum.index
            ))
        })?;
        if slot.is_some() {
            return Err(PrismError::EmbeddingComputation(format!(
                "Duplicate embedding index {}",
                datum.index
            )));
        }
        *slot = Some(datum.embedding);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| PrismError::EmbeddingComputation("Missing embedding index".to_string()))
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
        let mut out = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(self.config.batch_size).enumerate() {
            tracing::debug!(
                "Embedding chunk {} ({} texts) with {}",
                i,
                chunk.len(),
                self.config.model
            );
            out.extend(self.embed_chunk(chunk).await?);
        }
        Ok(out)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.config.dimensions
    }
}
