// crates/prism-store/src/records.rs
//
// Read-only access to the flat JSON files kept by the response collector:
//
//   prompts.json   -> [{ "id": 1, "text": "...", "category": "..." }, ...]
//   responses.json -> [{ "prompt_id": 1, "prompt": "...", "model": "...", "response": "..." }, ...]
//
// The collector owns these files. Prism only reads them.

use std::fs;
use std::path::{Path, PathBuf};

use prism_core::error::PrismError;
use prism_core::record::{Prompt, ResponseRecord};

/// Reader for the prompt and response JSON files.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    prompts_path: PathBuf,
    responses_path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(prompts_path: impl Into<PathBuf>, responses_path: impl Into<PathBuf>) -> Self {
        Self {
            prompts_path: prompts_path.into(),
            responses_path: responses_path.into(),
        }
    }

    pub fn prompts_path(&self) -> &Path {
        &self.prompts_path
    }

    pub fn responses_path(&self) -> &Path {
        &self.responses_path
    }

    /// Load all prompts. A missing prompts file is an error: without it no
    /// response can be categorized.
    pub fn load_prompts(&self) -> Result<Vec<Prompt>, PrismError> {
        let contents = match fs::read_to_string(&self.prompts_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PrismError::NotFound(format!(
                    "Prompts file {}",
                    self.prompts_path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let prompts: Vec<Prompt> = serde_json::from_str(&contents)?;
        tracing::debug!(
            "Loaded {} prompts from {}",
            prompts.len(),
            self.prompts_path.display()
        );
        Ok(prompts)
    }

    /// Load all stored responses. A missing responses file reads as empty,
    /// since the collector only creates it after the first response.
    pub fn load_responses(&self) -> Result<Vec<ResponseRecord>, PrismError> {
        let contents = match fs::read_to_string(&self.responses_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No responses file at {}",
                    self.responses_path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let responses: Vec<ResponseRecord> = serde_json::from_str(&contents)?;
        tracing::debug!(
            "Loaded {} responses from {}",
            responses.len(),
            self.responses_path.display()
        );
        Ok(responses)
    }
}
