// crates/prism-pipeline/src/metadata.rs
//
// Summary of what is available to visualize: models, categories, and counts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use prism_core::record::{Prompt, ResponseRecord};

use crate::assembler::UNKNOWN_CATEGORY;

/// Models and categories present in the response store, with counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMetadata {
    /// Distinct chat models with at least one response, sorted.
    pub models: Vec<String>,
    /// Distinct prompt categories, sorted.
    pub categories: Vec<String>,
    /// Responses per model.
    pub model_counts: BTreeMap<String, usize>,
    /// Responses per prompt category. Ungrouped responses are not counted.
    pub category_counts: BTreeMap<String, usize>,
    pub total_responses: usize,
}

impl EmbeddingMetadata {
    pub fn collect(responses: &[ResponseRecord], prompts: &[Prompt]) -> Self {
        let index: HashMap<i64, &Prompt> = prompts.iter().map(|p| (p.id, p)).collect();

        let mut model_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut categories: BTreeSet<String> =
            prompts.iter().map(|p| p.category.clone()).collect();

        for r in responses {
            *model_counts.entry(r.model.clone()).or_default() += 1;
            if let Some(prompt_id) = r.prompt_id {
                let category = index
                    .get(&prompt_id)
                    .map(|p| p.category.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                categories.insert(category.clone());
                *category_counts.entry(category).or_default() += 1;
            }
        }

        Self {
            models: model_counts.keys().cloned().collect(),
            categories: categories.into_iter().collect(),
            model_counts,
            category_counts,
            total_responses: responses.len(),
        }
    }
}
