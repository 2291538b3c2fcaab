// crates/prism-cli/src/main.rs
//
// CLI entrypoint for Prism, a response-embedding visualizer.
//
// Loads configuration, initializes tracing on stderr, and dispatches to the
// visualize, metadata, and cache subcommands.

mod commands;
mod config;
mod embedder;
mod output;

use clap::{Parser, Subcommand};
use commands::cache::CacheCmd;
use commands::metadata::MetadataCmd;
use commands::visualize::VisualizeCmd;
use config::PrismConfig;

/// Prism CLI: map how chat models answer the same prompts.
#[derive(Parser, Debug)]
#[command(
    name = "prism",
    version = "0.1.0",
    about = "Embed chat-model responses, center them by prompt, and project them to 2D"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.prism/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a 2D visualization of stored responses.
    Visualize(VisualizeCmd),

    /// List models and categories available to visualize.
    Metadata(MetadataCmd),

    /// Embedding cache management: stats, clear.
    #[command(subcommand)]
    Cache(CacheCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Config is read before tracing starts so its log level can apply.
    let loaded = PrismConfig::load(&cli.config);
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => PrismConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match &loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", cli.config),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }
    config.validate()?;

    match &cli.command {
        Commands::Visualize(cmd) => commands::visualize::run(cmd, &config).await?,
        Commands::Metadata(cmd) => commands::metadata::run(cmd, &config).await?,
        Commands::Cache(cmd) => commands::cache::run(cmd, &config).await?,
    }

    Ok(())
}
