// crates/prism-pipeline/src/pipeline.rs
//
// VisualizationPipeline: stored responses -> visualization payload.
//
// Stages run in order and every per-record sequence stays index-aligned with
// the selected records:
//   1. resolve embeddings through the cache
//   2. optionally center by prompt id
//   3. project to 2D with UMAP
//   4. assemble flat records with metadata and previews

use std::collections::HashMap;

use prism_core::error::PrismError;
use prism_core::record::{Prompt, ResponseRecord, TextRecord};
use prism_core::traits::Embedder;
use prism_embed::EmbeddingResolver;
use prism_project::umap::MIN_POINTS;
use prism_project::{center_by_group, UmapProjector};

use crate::assembler::{assemble, CacheStats, VisualizationPayload};
use crate::providers::ProviderTable;
use crate::request::VisualizeRequest;

/// Embeddings for a set of records, before projection.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRecords {
    /// One vector per record, centered when requested.
    pub vectors: Vec<Vec<f32>>,
    pub stats: CacheStats,
}

/// Index prompts by id for metadata joins.
pub fn prompt_index(prompts: &[Prompt]) -> HashMap<i64, &Prompt> {
    prompts.iter().map(|p| (p.id, p)).collect()
}

pub struct VisualizationPipeline<E: Embedder> {
    resolver: EmbeddingResolver<E>,
    projector: UmapProjector,
    providers: ProviderTable,
}

impl<E: Embedder> VisualizationPipeline<E> {
    pub fn new(
        resolver: EmbeddingResolver<E>,
        projector: UmapProjector,
        providers: ProviderTable,
    ) -> Self {
        Self {
            resolver,
            projector,
            providers,
        }
    }

    pub fn resolver(&self) -> &EmbeddingResolver<E> {
        &self.resolver
    }

    pub fn projector(&self) -> &UmapProjector {
        &self.projector
    }

    /// Resolve embeddings for `records` and center them by prompt if asked.
    pub async fn embed(
        &self,
        records: &[TextRecord],
        center: bool,
    ) -> Result<EmbeddedRecords, PrismError> {
        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let resolution = self.resolver.resolve(&texts).await?;

        let stats = CacheStats {
            total: records.len(),
            cached_count: resolution.cached_count,
            computed_count: resolution.computed_count,
        };

        let vectors = if center {
            let groups: Vec<i64> = records.iter().map(|r| r.prompt_id).collect();
            center_by_group(&resolution.vectors, &groups)?
        } else {
            resolution.vectors
        };

        Ok(EmbeddedRecords { vectors, stats })
    }

    /// Run every stage for `records`.
    ///
    /// Fails with `InsufficientData` before any embedding work when fewer
    /// than two records are given.
    pub async fn run(
        &self,
        records: &[TextRecord],
        prompts: &[Prompt],
        center: bool,
    ) -> Result<VisualizationPayload, PrismError> {
        if records.len() < MIN_POINTS {
            return Err(PrismError::InsufficientData {
                required: MIN_POINTS,
                actual: records.len(),
            });
        }

        tracing::info!(
            "Building visualization for {} responses (centered: {})",
            records.len(),
            center
        );

        let embedded = self.embed(records, center).await?;
        tracing::debug!(
            "Embeddings ready: {} cached, {} computed",
            embedded.stats.cached_count,
            embedded.stats.computed_count
        );

        let points = self.projector.project(&embedded.vectors)?;
        let index = prompt_index(prompts);
        let data = assemble(records, &points, &index, &self.providers)?;

        tracing::info!("Visualization complete: {} points", data.len());

        Ok(VisualizationPayload {
            data,
            stats: embedded.stats,
            centered: center,
        })
    }

    /// Apply `request` to the stored responses and run the pipeline.
    pub async fn visualize(
        &self,
        responses: &[ResponseRecord],
        prompts: &[Prompt],
        request: &VisualizeRequest,
    ) -> Result<VisualizationPayload, PrismError> {
        let index = prompt_index(prompts);
        let records = request.select(responses, &index);
        self.run(&records, prompts, request.center_by_prompt).await
    }
}
