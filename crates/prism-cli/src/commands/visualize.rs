// crates/prism-cli/src/commands/visualize.rs
//
// `prism visualize`: embed stored responses, center by prompt, project to
// 2D, and print or write the visualization payload.

use std::fs;

use clap::Args;
use tabled::Tabled;

use prism_embed::EmbeddingResolver;
use prism_pipeline::{
    ProviderTable, VisualizationPayload, VisualizationPipeline, VisualizeRequest,
};
use prism_project::UmapProjector;
use prism_store::JsonRecordStore;

use crate::config::PrismConfig;
use crate::embedder::Backend;
use crate::output::{format_coord, format_json, format_table, OutputFormat};

/// Visualization command.
#[derive(Debug, Args)]
pub struct VisualizeCmd {
    /// Only include these chat models (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub models: Option<Vec<String>>,

    /// Only include prompts in these categories (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Project raw embeddings instead of centering by prompt.
    #[arg(long)]
    pub no_center: bool,

    /// Output format: table or json.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,

    /// Write the JSON payload to this file instead of stdout.
    #[arg(long)]
    pub output: Option<String>,
}

impl VisualizeCmd {
    fn request(&self) -> VisualizeRequest {
        VisualizeRequest {
            models: self.models.clone(),
            categories: self.categories.clone(),
            center_by_prompt: !self.no_center,
        }
    }
}

/// A row in the visualization table.
#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "X")]
    x: String,
    #[tabled(rename = "Y")]
    y: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Prompt")]
    prompt_id: i64,
    #[tabled(rename = "Category")]
    category: String,
}

/// Run the visualize command.
pub async fn run(
    cmd: &VisualizeCmd,
    config: &PrismConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonRecordStore::new(config.prompts_path(), config.responses_path());
    let prompts = store.load_prompts()?;
    let responses = store.load_responses()?;

    let backend = Backend::from_config(&config.embedding)?;
    let resolver = EmbeddingResolver::new(backend, config.cache_path());
    let projector = UmapProjector::new(config.projection.to_umap())?;
    let providers = ProviderTable::new(config.models.clone());
    let pipeline = VisualizationPipeline::new(resolver, projector, providers);

    let payload = pipeline
        .visualize(&responses, &prompts, &cmd.request())
        .await?;

    if let Some(path) = &cmd.output {
        fs::write(path, format_json(&payload)?)?;
        tracing::info!("Wrote {} points to {}", payload.data.len(), path);
        print_summary(&payload);
        return Ok(());
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", format_json(&payload)?),
        OutputFormat::Table => {
            let rows: Vec<PointRow> = payload
                .data
                .iter()
                .map(|p| PointRow {
                    x: format_coord(p.x),
                    y: format_coord(p.y),
                    model: p.model.clone(),
                    provider: p.provider.clone(),
                    prompt_id: p.prompt_id,
                    category: p.category.clone(),
                })
                .collect();
            println!("{}", format_table(&rows));
            println!();
            print_summary(&payload);
        }
    }

    Ok(())
}

fn print_summary(payload: &VisualizationPayload) {
    println!(
        "Points: {}  |  Cached: {}  |  Computed: {}  |  Centered: {}",
        payload.stats.total,
        payload.stats.cached_count,
        payload.stats.computed_count,
        if payload.centered { "yes" } else { "no" }
    );
}
