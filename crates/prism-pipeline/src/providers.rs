// crates/prism-pipeline/src/providers.rs
//
// Chat model -> provider lookup used to denormalize visualization records.

use std::collections::BTreeMap;

/// Provider name used when neither the table nor the model id names one.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// Configured model-to-provider table.
///
/// Models not listed fall back to the `provider/` prefix of their id
/// (e.g. "openai/gpt-5" -> "openai").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderTable {
    providers: BTreeMap<String, String>,
}

impl ProviderTable {
    pub fn new(providers: BTreeMap<String, String>) -> Self {
        Self { providers }
    }

    pub fn provider_for(&self, model: &str) -> String {
        if let Some(p) = self.providers.get(model) {
            return p.clone();
        }
        match model.split_once('/') {
            Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
            _ => UNKNOWN_PROVIDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_provider_wins() {
        let mut map = BTreeMap::new();
        map.insert("openrouter/polaris-alpha".to_string(), "openrouter".to_string());
        map.insert("minimax/minimax-m2:free".to_string(), "minimax-free".to_string());
        let table = ProviderTable::new(map);
        assert_eq!(table.provider_for("minimax/minimax-m2:free"), "minimax-free");
        assert_eq!(table.provider_for("openrouter/polaris-alpha"), "openrouter");
    }

    #[test]
    fn test_prefix_fallback() {
        let table = ProviderTable::default();
        assert_eq!(table.provider_for("anthropic/claude-sonnet-4.5"), "anthropic");
        assert_eq!(table.provider_for("local-model"), UNKNOWN_PROVIDER);
        assert_eq!(table.provider_for("/weird"), UNKNOWN_PROVIDER);
    }
}
