//! Scripted backend for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::backend::{JudgeBackend, JudgeRequest};
use super::error::JudgeError;
use super::types::BackendKind;

/// Backend that answers from a fixed per-intent script.
#[derive(Debug)]
pub struct ScriptedBackend {
    kind: BackendKind,
    available: bool,
    responses: HashMap<String, String>,
    default_response: String,
    failing: HashSet<String>,
    fail_all: bool,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            available: true,
            responses: HashMap::new(),
            default_response: "否".to_string(),
            failing: HashSet::new(),
            fail_all: false,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn local() -> Self {
        Self::new(BackendKind::Local)
    }

    pub fn remote() -> Self {
        Self::new(BackendKind::Remote)
    }

    pub fn respond(mut self, intent_code: &str, output: &str) -> Self {
        self.responses
            .insert(intent_code.to_string(), output.to_string());
        self
    }

    pub fn default_response(mut self, output: &str) -> Self {
        self.default_response = output.to_string();
        self
    }

    pub fn fail_on(mut self, intent_code: &str) -> Self {
        self.failing.insert(intent_code.to_string());
        self
    }

    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn delay(mut self, intent_code: &str, delay: Duration) -> Self {
        self.delays.insert(intent_code.to_string(), delay);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JudgeBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn invoke(&self, request: &JudgeRequest) -> Result<String, JudgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&request.intent_code) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_all || self.failing.contains(&request.intent_code) {
            return Err(JudgeError::Backend {
                kind: self.kind,
                reason: format!("scripted failure for {}", request.intent_code),
            });
        }

        Ok(self
            .responses
            .get(&request.intent_code)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}
