use std::collections::HashMap;

/// Source of human-readable intent descriptions used in prompts.
pub trait IntentMetadataSource: Send + Sync {
    fn describe(&self, intent_code: &str) -> Option<String>;

    /// Description, or the intent code itself when none is known.
    fn describe_or_code(&self, intent_code: &str) -> String {
        self.describe(intent_code)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| intent_code.to_string())
    }
}

/// In-memory intent catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticIntentCatalog {
    descriptions: HashMap<String, String>,
}

impl StaticIntentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, intent_code: impl Into<String>, description: impl Into<String>) -> Self {
        self.insert(intent_code, description);
        self
    }

    pub fn insert(&mut self, intent_code: impl Into<String>, description: impl Into<String>) {
        self.descriptions
            .insert(intent_code.into(), description.into());
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

impl IntentMetadataSource for StaticIntentCatalog {
    fn describe(&self, intent_code: &str) -> Option<String> {
        self.descriptions.get(intent_code).cloned()
    }
}

impl FromIterator<(String, String)> for StaticIntentCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            descriptions: iter.into_iter().collect(),
        }
    }
}
