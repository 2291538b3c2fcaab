// crates/prism-core/src/record.rs
//
// Record shapes exchanged with the prompt/response store and the
// visualization consumer.

use serde::{Deserialize, Serialize};

/// A prompt from the prompt store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub text: String,
    pub category: String,
}

/// A stored chat-model response, as persisted by the response store.
///
/// Older records may predate prompt ids; those cannot be grouped by prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(default)]
    pub prompt_id: Option<i64>,
    /// Prompt text as sent to the model.
    #[serde(default)]
    pub prompt: String,
    /// Chat model identifier (e.g., "openai/gpt-5").
    pub model: String,
    /// Free-text response.
    pub response: String,
}

impl ResponseRecord {
    /// Convert to a `TextRecord`, or `None` if the record has no prompt id.
    pub fn to_text_record(&self) -> Option<TextRecord> {
        self.prompt_id.map(|prompt_id| TextRecord {
            prompt_id,
            model: self.model.clone(),
            text: self.response.clone(),
            prompt: self.prompt.clone(),
        })
    }
}

/// One response text entering the embedding pipeline.
///
/// Immutable for the duration of a pipeline run. Every per-record sequence
/// produced downstream (vectors, centered vectors, projected points) is
/// index-aligned with the slice of `TextRecord`s it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub prompt_id: i64,
    pub model: String,
    pub text: String,
    /// Prompt text carried on the stored response. Empty when unknown.
    #[serde(default)]
    pub prompt: String,
}

impl TextRecord {
    pub fn new(prompt_id: i64, model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            prompt_id,
            model: model.into(),
            text: text.into(),
            prompt: String::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Derived identity: `{prompt_id}:{model}`. Not persisted.
    pub fn id(&self) -> String {
        format!("{}:{}", self.prompt_id, self.model)
    }
}

/// A point in the 2D projection.
///
/// Coordinates carry no absolute meaning: scale, rotation, and translation are
/// arbitrary. Only relative distances and clustering are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    /// Euclidean distance to another point.
    pub fn distance(&self, other: &ProjectedPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_without_prompt_id_is_ungroupable() {
        let legacy: ResponseRecord =
            serde_json::from_str(r#"{"prompt":"hi","model":"openai/gpt-5","response":"hello"}"#)
                .unwrap();
        assert_eq!(legacy.prompt_id, None);
        assert!(legacy.to_text_record().is_none());
    }

    #[test]
    fn test_response_to_text_record() {
        let r = ResponseRecord {
            prompt_id: Some(3),
            prompt: "What is rust?".to_string(),
            model: "anthropic/claude-haiku-4.5".to_string(),
            response: "A language.".to_string(),
        };
        let t = r.to_text_record().unwrap();
        assert_eq!(t.prompt_id, 3);
        assert_eq!(t.text, "A language.");
        assert_eq!(t.prompt, "What is rust?");
        assert_eq!(t.id(), "3:anthropic/claude-haiku-4.5");
    }

    #[test]
    fn test_projected_point_distance() {
        let a = ProjectedPoint { x: 0.0, y: 0.0 };
        let b = ProjectedPoint { x: 3.0, y: 4.0 };
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }
}
