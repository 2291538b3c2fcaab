// crates/prism-pipeline/src/request.rs
//
// Visualization request: which responses to include and whether to center.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use prism_core::record::{Prompt, ResponseRecord, TextRecord};

use crate::assembler::UNKNOWN_CATEGORY;

/// Filters and options for one visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeRequest {
    /// Only include these chat models. `None` includes all.
    #[serde(default)]
    pub models: Option<Vec<String>>,
    /// Only include responses to prompts in these categories. `None` includes all.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Subtract each prompt's mean embedding before projection.
    #[serde(default = "default_center_by_prompt")]
    pub center_by_prompt: bool,
}

fn default_center_by_prompt() -> bool {
    true
}

impl Default for VisualizeRequest {
    fn default() -> Self {
        Self {
            models: None,
            categories: None,
            center_by_prompt: default_center_by_prompt(),
        }
    }
}

impl VisualizeRequest {
    /// Select the records this request covers, preserving store order.
    ///
    /// Responses without a prompt id are skipped: they cannot be grouped.
    pub fn select(
        &self,
        responses: &[ResponseRecord],
        prompts: &HashMap<i64, &Prompt>,
    ) -> Vec<TextRecord> {
        let mut ungrouped = 0;
        let selected: Vec<TextRecord> = responses
            .iter()
            .filter_map(|r| {
                let record = r.to_text_record();
                if record.is_none() {
                    ungrouped += 1;
                }
                record
            })
            .filter(|r| match &self.models {
                Some(models) => models.iter().any(|m| m == &r.model),
                None => true,
            })
            .filter(|r| match &self.categories {
                Some(categories) => {
                    let category = prompts
                        .get(&r.prompt_id)
                        .map(|p| p.category.as_str())
                        .unwrap_or(UNKNOWN_CATEGORY);
                    categories.iter().any(|c| c == category)
                }
                None => true,
            })
            .collect();

        if ungrouped > 0 {
            tracing::warn!("Skipped {} responses without a prompt id", ungrouped);
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(prompt_id: Option<i64>, model: &str, text: &str) -> ResponseRecord {
        ResponseRecord {
            prompt_id,
            prompt: String::new(),
            model: model.to_string(),
            response: text.to_string(),
        }
    }

    fn prompts() -> Vec<Prompt> {
        vec![
            Prompt {
                id: 1,
                text: "a".to_string(),
                category: "coding".to_string(),
            },
            Prompt {
                id: 2,
                text: "b".to_string(),
                category: "ethics".to_string(),
            },
        ]
    }

    fn responses() -> Vec<ResponseRecord> {
        vec![
            response(Some(1), "openai/gpt-5", "r1"),
            response(Some(2), "openai/gpt-5", "r2"),
            response(Some(1), "google/gemini-2.5-pro", "r3"),
            response(None, "openai/gpt-5", "legacy"),
            response(Some(3), "google/gemini-2.5-pro", "r5"),
        ]
    }

    #[test]
    fn test_default_request_keeps_all_grouped_records() {
        let p = prompts();
        let index: HashMap<i64, &Prompt> = p.iter().map(|p| (p.id, p)).collect();
        let selected = VisualizeRequest::default().select(&responses(), &index);
        let texts: Vec<&str> = selected.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["r1", "r2", "r3", "r5"]);
    }

    #[test]
    fn test_model_and_category_filters() {
        let p = prompts();
        let index: HashMap<i64, &Prompt> = p.iter().map(|p| (p.id, p)).collect();
        let request = VisualizeRequest {
            models: Some(vec!["openai/gpt-5".to_string()]),
            categories: Some(vec!["coding".to_string()]),
            center_by_prompt: false,
        };
        let selected = request.select(&responses(), &index);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].text, "r1");
    }

    #[test]
    fn test_unknown_category_filter() {
        let p = prompts();
        let index: HashMap<i64, &Prompt> = p.iter().map(|p| (p.id, p)).collect();
        let request = VisualizeRequest {
            categories: Some(vec![UNKNOWN_CATEGORY.to_string()]),
            ..VisualizeRequest::default()
        };
        let selected = request.select(&responses(), &index);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].prompt_id, 3);
    }

    #[test]
    fn test_request_json_defaults() {
        let request: VisualizeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, VisualizeRequest::default());
        assert!(request.center_by_prompt);

        let request: VisualizeRequest =
            serde_json::from_str(r#"{"models": null, "center_by_prompt": false}"#).unwrap();
        assert!(!request.center_by_prompt);
        assert!(request.models.is_none());
    }
}
