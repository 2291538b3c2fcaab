// crates/prism-cli/src/commands/cache.rs
//
// `prism cache stats|clear`: inspect or reset the embedding cache.

use clap::Subcommand;

use prism_core::traits::Embedder;
use prism_store::{EmbeddingCache, CACHE_SCHEMA_VERSION};

use crate::config::PrismConfig;
use crate::embedder::Backend;

/// Cache subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheCmd {
    /// Show cache location, model, and entry count.
    Stats,
    /// Remove every cached embedding.
    Clear,
}

/// Run a cache subcommand.
pub async fn run(cmd: &CacheCmd, config: &PrismConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = Backend::from_config(&config.embedding)?;
    let cache = EmbeddingCache::new(config.cache_path(), backend.model_id());

    match cmd {
        CacheCmd::Stats => {
            let store = cache.load();
            println!("Embedding cache");
            println!("  Path:     {}", cache.path().display());
            println!("  Model:    {}", store.embedding_model_id);
            println!("  Schema:   {}", CACHE_SCHEMA_VERSION);
            println!("  Entries:  {}", store.len());
            match store.updated_at {
                Some(ts) => println!("  Updated:  {}", ts.to_rfc3339()),
                None => println!("  Updated:  never"),
            }
        }
        CacheCmd::Clear => {
            let before = cache.load().len();
            cache.clear()?;
            println!(
                "Cleared {} cached embeddings from {}",
                before,
                cache.path().display()
            );
        }
    }

    Ok(())
}
