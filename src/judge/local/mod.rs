//! In-process pair classifier backend.
//!
//! Scores `(cleaned input, intent description)` with a BERT-style sequence-pair
//! classifier and answers with the match probability as decimal text, e.g. `"0.8731"`.
//! Without a model directory it can run in lexical stub mode for development.

pub mod bert;
pub mod config;
pub mod device;


pub use config::LocalBackendConfig;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use self::bert::PairClassifier;
use self::device::select_device;
use super::backend::{JudgeBackend, JudgeRequest};
use super::error::JudgeError;
use super::types::BackendKind;

struct LoadedModel {
    device: Device,
    model: PairClassifier,
    tokenizer: Tokenizer,
}

pub struct LocalClassifierBackend {
    config: LocalBackendConfig,
    loaded: Option<Arc<LoadedModel>>,
}

impl std::fmt::Debug for LocalClassifierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalClassifierBackend")
            .field("config", &self.config)
            .field("model_loaded", &self.loaded.is_some())
            .finish()
    }
}

impl LocalClassifierBackend {
    pub fn load(config: LocalBackendConfig) -> Result<Self, JudgeError> {
        config
            .validate()
            .map_err(|reason| JudgeError::InvalidConfig { reason })?;

        let Some(model_path) = config.model_path.clone() else {
            info!(
                allow_stub = config.allow_stub,
                "No local classifier model configured"
            );
            return Ok(Self {
                config,
                loaded: None,
            });
        };

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_path.join(required).exists() {
                return Err(JudgeError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        let device = select_device();
        info!(model_path = %model_path.display(), ?device, "Loading local classifier");

        let model = PairClassifier::load(&model_path, &device).map_err(|e| {
            JudgeError::ModelLoadFailed {
                reason: format!("Failed to load classifier: {}", e),
            }
        })?;
        let tokenizer = load_tokenizer(&model_path, config.max_seq_len)?;

        info!("Local classifier loaded");

        Ok(Self {
            config,
            loaded: Some(Arc::new(LoadedModel {
                device,
                model,
                tokenizer,
            })),
        })
    }

    pub fn stub() -> Self {
        Self {
            config: LocalBackendConfig::stub(),
            loaded: None,
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn config(&self) -> &LocalBackendConfig {
        &self.config
    }

    /// Match probability for an `(input, description)` pair.
    pub async fn probability(&self, input: &str, description: &str) -> Result<f32, JudgeError> {
        let Some(loaded) = self.loaded.clone() else {
            return Ok(lexical_probability(input, description));
        };

        let input = input.to_string();
        let description = description.to_string();
        tokio::task::spawn_blocking(move || classify(&loaded, &input, &description))
            .await
            .map_err(|e| JudgeError::InferenceFailed {
                reason: format!("classifier task failed: {}", e),
            })?
    }
}

#[async_trait]
impl JudgeBackend for LocalClassifierBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn is_available(&self) -> bool {
        self.loaded.is_some() || self.config.allow_stub
    }

    async fn invoke(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        if self.loaded.is_none() && !self.config.allow_stub {
            return Err(JudgeError::Backend {
                kind: BackendKind::Local,
                reason: "no model loaded".to_string(),
            });
        }

        let probability = self
            .probability(&request.input, &request.intent_description)
            .await?;

        debug!(
            intent = %request.intent_code,
            probability,
            model_loaded = self.loaded.is_some(),
            "Local classifier scored pair"
        );

        Ok(format!("{:.4}", probability))
    }
}

fn load_tokenizer(model_path: &Path, max_len: usize) -> Result<Tokenizer, JudgeError> {
    let mut tokenizer = Tokenizer::from_file(model_path.join("tokenizer.json")).map_err(|e| {
        JudgeError::ModelLoadFailed {
            reason: format!("Failed to load tokenizer: {}", e),
        }
    })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| JudgeError::ModelLoadFailed {
            reason: format!("Failed to configure truncation: {}", e),
        })?;

    Ok(tokenizer)
}

fn classify(loaded: &LoadedModel, input: &str, description: &str) -> Result<f32, JudgeError> {
    let tokens = loaded
        .tokenizer
        .encode((input, description), true)
        .map_err(|e| JudgeError::TokenizationFailed {
            reason: e.to_string(),
        })?;

    let to_tensor = |ids: &[u32]| -> Result<Tensor, JudgeError> {
        Ok(Tensor::new(ids, &loaded.device)?.unsqueeze(0)?)
    };
    let token_ids = to_tensor(tokens.get_ids())?;
    let type_ids = to_tensor(tokens.get_type_ids())?;
    let attention_mask = to_tensor(tokens.get_attention_mask())?;

    let logit = loaded
        .model
        .logit(&token_ids, &type_ids, &attention_mask)?;

    Ok(sigmoid(logit))
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Overlap of ASCII words and CJK character bigrams, squashed to `[0, 1]`.
fn lexical_probability(input: &str, description: &str) -> f32 {
    let input_terms = terms(input);
    if input_terms.is_empty() {
        return 0.0;
    }
    let description_terms = terms(description);

    let shared = input_terms.intersection(&description_terms).count();
    let recall = shared as f32 / input_terms.len() as f32;
    let union = input_terms.union(&description_terms).count();
    let jaccard = if union > 0 {
        shared as f32 / union as f32
    } else {
        0.0
    };

    sigmoid(8.0 * ((0.6 * recall + 0.4 * jaccard) - 0.5)).clamp(0.0, 1.0)
}

fn terms(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    let mut out: HashSet<String> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let cjk: Vec<char> = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() && !c.is_ascii())
        .collect();
    match cjk.len() {
        0 => {}
        1 => {
            out.insert(cjk[0].to_string());
        }
        _ => out.extend(cjk.windows(2).map(|pair| pair.iter().collect::<String>())),
    }

    out
}
