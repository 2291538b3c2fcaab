// crates/prism-cli/src/embedder.rs
//
// Backend selection: builds the configured `Embedder`.

use async_trait::async_trait;

use prism_core::error::PrismError;
use prism_core::traits::Embedder;
use prism_embed::{HashEmbedder, HttpEmbedder, HttpEmbedderConfig};

use crate::config::EmbeddingConfig;

/// Width used by the hash backend when none is configured.
const DEFAULT_HASH_DIMENSIONS: usize = 384;

/// The embedding backend chosen in config.
pub enum Backend {
    Hash(HashEmbedder),
    Http(HttpEmbedder),
}

impl Backend {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, PrismError> {
        match config.backend.as_str() {
            "hash" => Ok(Backend::Hash(HashEmbedder::new(
                config.dimensions.unwrap_or(DEFAULT_HASH_DIMENSIONS),
            ))),
            "http" => {
                let api_key = std::env::var(&config.api_key_env).ok();
                if api_key.is_none() {
                    tracing::debug!(
                        "{} is not set; calling {} without credentials",
                        config.api_key_env,
                        config.api_url
                    );
                }
                let http = HttpEmbedderConfig {
                    api_key,
                    batch_size: config.batch_size,
                    dimensions: config.dimensions,
                    ..HttpEmbedderConfig::new(&config.api_url, &config.model)
                };
                Ok(Backend::Http(HttpEmbedder::new(http)?))
            }
            other => Err(PrismError::Config(format!(
                "Unknown embedding backend '{}'",
                other
            ))),
        }
    }
}

#[async_trait]
impl Embedder for Backend {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PrismError> {
        match self {
            Backend::Hash(e) => e.embed_batch(texts).await,
            Backend::Http(e) => e.embed_batch(texts).await,
        }
    }

    fn model_id(&self) -> &str {
        match self {
            Backend::Hash(e) => e.model_id(),
            Backend::Http(e) => e.model_id(),
        }
    }

    fn dimensions(&self) -> Option<usize> {
        match self {
            Backend::Hash(e) => e.dimensions(),
            Backend::Http(e) => e.dimensions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_backend_uses_configured_width() {
        let config = EmbeddingConfig {
            dimensions: Some(64),
            ..EmbeddingConfig::default()
        };
        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.model_id(), "hash/64");
        assert_eq!(backend.dimensions(), Some(64));
    }

    #[test]
    fn test_hash_backend_without_width_uses_default() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.dimensions, None);
        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.dimensions(), Some(DEFAULT_HASH_DIMENSIONS));
        assert_eq!(backend.model_id(), "hash/384");
    }

    #[test]
    fn test_http_backend_uses_model_id() {
        let config = EmbeddingConfig {
            backend: "http".to_string(),
            model: "text-embedding-3-small".to_string(),
            ..EmbeddingConfig::default()
        };
        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.model_id(), "text-embedding-3-small");
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let config = EmbeddingConfig {
            backend: "onnx".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            Backend::from_config(&config),
            Err(PrismError::Config(_))
        ));
    }
}
