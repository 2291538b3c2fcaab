// crates/prism-cli/src/commands/metadata.rs
//
// `prism metadata`: list available models and categories with counts.

use clap::Args;
use tabled::Tabled;

use prism_pipeline::{EmbeddingMetadata, ProviderTable};
use prism_store::JsonRecordStore;

use crate::config::PrismConfig;
use crate::output::{format_json, format_table, OutputFormat};

/// Metadata command.
#[derive(Debug, Args)]
pub struct MetadataCmd {
    /// Output format: table or json.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Responses")]
    responses: usize,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Responses")]
    responses: usize,
}

/// Run the metadata command.
pub async fn run(
    cmd: &MetadataCmd,
    config: &PrismConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonRecordStore::new(config.prompts_path(), config.responses_path());
    let prompts = store.load_prompts()?;
    let responses = store.load_responses()?;
    let metadata = EmbeddingMetadata::collect(&responses, &prompts);

    match cmd.format {
        OutputFormat::Json => println!("{}", format_json(&metadata)?),
        OutputFormat::Table => {
            let providers = ProviderTable::new(config.models.clone());
            let models: Vec<ModelRow> = metadata
                .model_counts
                .iter()
                .map(|(model, count)| ModelRow {
                    model: model.clone(),
                    provider: providers.provider_for(model),
                    responses: *count,
                })
                .collect();
            let categories: Vec<CategoryRow> = metadata
                .categories
                .iter()
                .map(|c| CategoryRow {
                    category: c.clone(),
                    responses: metadata.category_counts.get(c).copied().unwrap_or(0),
                })
                .collect();

            println!("{}", format_table(&models));
            println!();
            println!("{}", format_table(&categories));
            println!();
            println!("Total responses: {}", metadata.total_responses);
        }
    }

    Ok(())
}
