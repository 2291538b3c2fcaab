// crates/prism-cli/src/config.rs
//
// Runtime configuration for the Prism CLI.
// Loaded from a TOML file or populated with defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use prism_core::error::PrismError;
use prism_project::UmapConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PrismConfig {
    /// Directory holding the record files and the embedding cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Prompt file name, relative to `data_dir` unless absolute.
    #[serde(default = "default_prompts_file")]
    pub prompts_file: String,

    #[serde(default = "default_responses_file")]
    pub responses_file: String,

    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Chat model id -> provider name.
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

/// Which embedding backend to use and how to reach it.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// "hash" (offline, deterministic) or "http" (OpenAI-compatible endpoint).
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Vector width. The hash backend defaults to 384 when unset; for http
    /// it is the expected width of returned vectors.
    #[serde(default)]
    pub dimensions: Option<usize>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// UMAP parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_n_neighbors")]
    pub n_neighbors: usize,
    #[serde(default = "default_min_dist")]
    pub min_dist: f64,
    #[serde(default = "default_spread")]
    pub spread: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub n_epochs: Option<usize>,
}

fn default_data_dir() -> String {
    "~/.prism/data".to_string()
}

fn default_prompts_file() -> String {
    "prompts.json".to_string()
}

fn default_responses_file() -> String {
    "responses.json".to_string()
}

fn default_cache_file() -> String {
    "embeddings_cache.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backend() -> String {
    "hash".to_string()
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-mpnet-base-v2".to_string()
}

fn default_api_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_api_key_env() -> String {
    "PRISM_EMBEDDING_API_KEY".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_n_neighbors() -> usize {
    15
}

fn default_min_dist() -> f64 {
    0.1
}

fn default_spread() -> f64 {
    1.0
}

fn default_seed() -> u64 {
    42
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_embedding_model(),
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            dimensions: None,
            batch_size: default_batch_size(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            n_neighbors: default_n_neighbors(),
            min_dist: default_min_dist(),
            spread: default_spread(),
            seed: default_seed(),
            n_epochs: None,
        }
    }
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            prompts_file: default_prompts_file(),
            responses_file: default_responses_file(),
            cache_file: default_cache_file(),
            log_level: default_log_level(),
            embedding: EmbeddingConfig::default(),
            projection: ProjectionConfig::default(),
            models: BTreeMap::new(),
        }
    }
}

impl ProjectionConfig {
    pub fn to_umap(&self) -> UmapConfig {
        UmapConfig {
            n_neighbors: self.n_neighbors,
            min_dist: self.min_dist,
            spread: self.spread,
            n_epochs: self.n_epochs,
            seed: self.seed,
            ..UmapConfig::default()
        }
    }
}

impl PrismConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: PrismConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Reject settings that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), PrismError> {
        if self.embedding.model.trim().is_empty() {
            return Err(PrismError::Config(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if !matches!(self.embedding.backend.as_str(), "hash" | "http") {
            return Err(PrismError::Config(format!(
                "Unknown embedding backend '{}' (expected \"hash\" or \"http\")",
                self.embedding.backend
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(PrismError::Config(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimensions == Some(0) {
            return Err(PrismError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        if self.projection.n_neighbors == 0 {
            return Err(PrismError::Config(
                "projection.n_neighbors must be at least 1".to_string(),
            ));
        }
        for (model, provider) in &self.models {
            match model.split_once('/') {
                Some((p, name)) if !p.is_empty() && !name.is_empty() => {}
                _ => {
                    return Err(PrismError::Config(format!(
                        "Model '{}' must be in provider/model-name form",
                        model
                    )))
                }
            }
            if provider.trim().is_empty() {
                return Err(PrismError::Config(format!(
                    "Model '{}' has an empty provider",
                    model
                )));
            }
        }
        Ok(())
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(expand_tilde(file));
        if path.is_absolute() {
            path
        } else {
            PathBuf::from(expand_tilde(&self.data_dir)).join(path)
        }
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.resolve(&self.prompts_file)
    }

    pub fn responses_path(&self) -> PathBuf {
        self.resolve(&self.responses_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.resolve(&self.cache_file)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}
