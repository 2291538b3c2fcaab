// crates/prism-pipeline/src/lib.rs
//
// prism-pipeline: From stored responses to a visualization payload.
//
// Control flow for one request:
//   select records (model/category filters)
//     -> resolve embeddings (cache first, compute misses)
//     -> center by prompt (optional)
//     -> UMAP projection
//     -> assemble flat records with metadata and previews

pub mod assembler;
pub mod metadata;
pub mod pipeline;
pub mod providers;
pub mod request;

pub use assembler::{assemble, CacheStats, VisualizationPayload, VisualizationPoint};
pub use metadata::EmbeddingMetadata;
pub use pipeline::{EmbeddedRecords, VisualizationPipeline};
pub use providers::ProviderTable;
pub use request::VisualizeRequest;
