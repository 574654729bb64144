use std::path::PathBuf;

use crate::constants::DEFAULT_LOCAL_MAX_SEQ_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBackendConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_path: Option<PathBuf>,

    pub max_seq_len: usize,

    /// Without a model, serve lexical-overlap scores instead of reporting unavailable.
    pub allow_stub: bool,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: DEFAULT_LOCAL_MAX_SEQ_LEN,
            allow_stub: false,
        }
    }
}

impl LocalBackendConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self {
            model_path: None,
            allow_stub: true,
            ..Default::default()
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len == 0 {
            return Err("max_seq_len must be greater than 0".to_string());
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let model_path = std::env::var("DISCRIMINATOR_LOCAL_MODEL_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let max_seq_len = std::env::var("DISCRIMINATOR_LOCAL_MAX_SEQ_LEN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_seq_len);

        let allow_stub = std::env::var("DISCRIMINATOR_LOCAL_ALLOW_STUB")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.allow_stub);

        Self {
            model_path,
            max_seq_len,
            allow_stub,
        }
    }
}
