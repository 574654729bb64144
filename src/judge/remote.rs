//! Remote chat-completion backend.
//!
//! Sends the rendered prompt through `genai`, which resolves the provider from the model
//! name and reads credentials from the provider's usual environment variables.

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::debug;

use super::backend::{JudgeBackend, JudgeRequest};
use super::error::JudgeError;
use super::types::BackendKind;
use crate::constants::DEFAULT_REMOTE_MODEL;

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an intent discriminator. Answer only 是 (yes) or 否 (no).";

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteBackendConfig {
    /// Use the remote model as fallback when the local classifier is unavailable or fails.
    pub enabled: bool,
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
}

impl Default for RemoteBackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: DEFAULT_REMOTE_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.0,
        }
    }
}

impl RemoteBackendConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var("DISCRIMINATOR_REMOTE_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.enabled);
        let model = std::env::var("DISCRIMINATOR_REMOTE_MODEL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.model);

        Self {
            enabled,
            model,
            ..defaults
        }
    }
}

pub struct RemoteChatBackend {
    client: Client,
    config: RemoteBackendConfig,
}

impl std::fmt::Debug for RemoteChatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteChatBackend")
            .field("config", &self.config)
            .finish()
    }
}

impl RemoteChatBackend {
    pub fn new(config: RemoteBackendConfig) -> Self {
        Self {
            client: Client::default(),
            config,
        }
    }

    pub fn with_client(client: Client, config: RemoteBackendConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &RemoteBackendConfig {
        &self.config
    }
}

#[async_trait]
impl JudgeBackend for RemoteChatBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn is_available(&self) -> bool {
        self.config.enabled && !self.config.model.trim().is_empty()
    }

    async fn invoke(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        let chat_req = ChatRequest::new(vec![
            ChatMessage::system(self.config.system_prompt.clone()),
            ChatMessage::user(request.prompt.clone()),
        ]);
        let options = ChatOptions::default().with_temperature(self.config.temperature);

        let response = self
            .client
            .exec_chat(&self.config.model, chat_req, Some(&options))
            .await
            .map_err(|e| JudgeError::Backend {
                kind: BackendKind::Remote,
                reason: e.to_string(),
            })?;

        let text = response.first_text().unwrap_or_default().to_string();
        debug!(
            intent = %request.intent_code,
            model = %self.config.model,
            output_len = text.len(),
            "Remote judge replied"
        );

        Ok(text)
    }
}
