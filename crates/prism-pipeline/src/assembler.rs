// crates/prism-pipeline/src/assembler.rs
//
// Joins projected coordinates back to their source records.
//
// One flat record per input item, in input order, carrying the coordinates
// plus denormalized metadata and truncated text previews.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use prism_core::error::PrismError;
use prism_core::record::{Prompt, ProjectedPoint, TextRecord};

use crate::providers::ProviderTable;

/// Character budget for prompt previews.
pub const PROMPT_PREVIEW_CHARS: usize = 100;
/// Character budget for response previews.
pub const RESPONSE_PREVIEW_CHARS: usize = 200;
/// Appended to a preview whose source exceeded its budget.
pub const TRUNCATION_MARKER: &str = "...";
/// Category reported for responses whose prompt is not in the prompt table.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One point of the visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationPoint {
    pub x: f64,
    pub y: f64,
    pub model: String,
    pub provider: String,
    pub prompt_id: i64,
    pub category: String,
    pub prompt_preview: String,
    pub response_preview: String,
}

/// Embedding cache usage for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Records in the run.
    pub total: usize,
    /// Records served from the persisted cache.
    pub cached_count: usize,
    /// Distinct texts embedded during the run.
    pub computed_count: usize,
}

/// Everything a rendering client needs for one visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationPayload {
    pub data: Vec<VisualizationPoint>,
    pub stats: CacheStats,
    /// Whether embeddings were centered by prompt before projection.
    pub centered: bool,
}

/// Truncate `text` to at most `budget` characters, appending the marker
/// when anything was cut.
pub fn preview(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Build visualization records from index-aligned `records` and `points`.
pub fn assemble(
    records: &[TextRecord],
    points: &[ProjectedPoint],
    prompts: &HashMap<i64, &Prompt>,
    providers: &ProviderTable,
) -> Result<Vec<VisualizationPoint>, PrismError> {
    if records.len() != points.len() {
        return Err(PrismError::InvalidInput(format!(
            "{} records but {} projected points",
            records.len(),
            points.len()
        )));
    }

    Ok(records
        .iter()
        .zip(points.iter())
        .map(|(record, point)| {
            let prompt = prompts.get(&record.prompt_id);
            VisualizationPoint {
                x: point.x,
                y: point.y,
                model: record.model.clone(),
                provider: providers.provider_for(&record.model),
                prompt_id: record.prompt_id,
                category: prompt
                    .map(|p| p.category.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
                prompt_preview: preview(
                    prompt.map(|p| p.text.as_str()).unwrap_or(record.prompt.as_str()),
                    PROMPT_PREVIEW_CHARS,
                ),
                response_preview: preview(&record.text, RESPONSE_PREVIEW_CHARS),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_within_budget_is_unchanged() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
        assert_eq!(preview("", 10), "");
    }

    #[test]
    fn test_preview_over_budget_is_marked() {
        assert_eq!(preview("eleven chars", 11), "eleven char...");
        let long = "x".repeat(250);
        let p = preview(&long, RESPONSE_PREVIEW_CHARS);
        assert_eq!(p.chars().count(), RESPONSE_PREVIEW_CHARS + TRUNCATION_MARKER.len());
        assert!(p.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "é".repeat(5);
        assert_eq!(preview(&text, 5), text);
        assert_eq!(preview(&text, 3), "ééé...");
    }

    #[test]
    fn test_assemble_joins_metadata() {
        let prompt = Prompt {
            id: 1,
            text: "p".repeat(120),
            category: "coding".to_string(),
        };
        let prompts: HashMap<i64, &Prompt> = [(1, &prompt)].into_iter().collect();
        let records = vec![
            TextRecord::new(1, "openai/gpt-5", "answer"),
            TextRecord::new(9, "local-model", "orphan"),
            TextRecord::new(8, "openai/gpt-5", "carried").with_prompt("Name a colour."),
            TextRecord::new(1, "openai/gpt-5", "stale").with_prompt("old wording"),
        ];
        let points = vec![
            ProjectedPoint { x: 1.0, y: 2.0 },
            ProjectedPoint { x: -1.0, y: 0.5 },
            ProjectedPoint { x: 0.0, y: 0.0 },
            ProjectedPoint { x: 0.3, y: 0.3 },
        ];

        let out = assemble(&records, &points, &prompts, &ProviderTable::default()).unwrap();
        assert_eq!(out.len(), 4);

        assert_eq!(out[0].x, 1.0);
        assert_eq!(out[0].provider, "openai");
        assert_eq!(out[0].category, "coding");
        assert_eq!(out[0].prompt_preview.len(), PROMPT_PREVIEW_CHARS + 3);
        assert_eq!(out[0].response_preview, "answer");

        assert_eq!(out[1].prompt_id, 9);
        assert_eq!(out[1].category, UNKNOWN_CATEGORY);
        assert_eq!(out[1].provider, "unknown");
        assert_eq!(out[1].prompt_preview, "");

        // Prompt missing from the table: the response's own prompt text is used.
        assert_eq!(out[2].category, UNKNOWN_CATEGORY);
        assert_eq!(out[2].prompt_preview, "Name a colour.");

        // The prompt table wins when both are present.
        assert_eq!(out[3].prompt_preview, out[0].prompt_preview);
    }

    #[test]
    fn test_assemble_rejects_misaligned_input() {
        let records = vec![TextRecord::new(1, "m/a", "t")];
        let err = assemble(&records, &[], &HashMap::new(), &ProviderTable::default()).unwrap_err();
        assert!(matches!(err, PrismError::InvalidInput(_)));
    }
}
