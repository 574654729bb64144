use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::JudgeError;
use super::types::BackendKind;

/// Everything a backend may need to judge one pair.
///
/// Chat models consume `prompt`; pair classifiers consume `input` and
/// `intent_description` directly.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub prompt: String,
    pub input: String,
    pub intent_code: String,
    pub intent_description: String,
}

/// Text-in, text-out judge backend.
///
/// Output must contain a positive marker, a negative marker, neither, or a probability.
/// Any `Err` counts as a backend failure.
#[async_trait]
pub trait JudgeBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Cheap readiness probe, called at startup and on explicit re-initialization.
    async fn is_available(&self) -> bool;

    async fn invoke(&self, request: &JudgeRequest) -> Result<String, JudgeError>;
}

/// Local-first backend selection with optional remote fallback.
///
/// Availability is probed once in [`BackendSet::initialize`] and again only on
/// [`BackendSet::reinitialize`].
pub struct BackendSet {
    local: Option<Arc<dyn JudgeBackend>>,
    remote: Option<Arc<dyn JudgeBackend>>,
    remote_fallback: bool,
    local_available: bool,
    remote_available: bool,
}

impl BackendSet {
    pub fn new(
        local: Option<Arc<dyn JudgeBackend>>,
        remote: Option<Arc<dyn JudgeBackend>>,
        remote_fallback: bool,
    ) -> Self {
        Self {
            local,
            remote,
            remote_fallback,
            local_available: false,
            remote_available: false,
        }
    }

    /// No backends at all; every judgment fails with [`JudgeError::BackendUnavailable`].
    pub fn empty() -> Self {
        Self::new(None, None, false)
    }

    pub async fn initialize(
        local: Option<Arc<dyn JudgeBackend>>,
        remote: Option<Arc<dyn JudgeBackend>>,
        remote_fallback: bool,
    ) -> Self {
        let mut set = Self::new(local, remote, remote_fallback);
        set.reinitialize().await;
        set
    }

    /// Re-probes backend availability.
    pub async fn reinitialize(&mut self) {
        self.local_available = match &self.local {
            Some(backend) => backend.is_available().await,
            None => false,
        };
        self.remote_available = match &self.remote {
            Some(backend) if self.remote_fallback => backend.is_available().await,
            _ => false,
        };

        info!(
            local_available = self.local_available,
            remote_available = self.remote_available,
            "Judge backends initialized"
        );
        if !self.local_available && !self.remote_available {
            warn!("No judge backend available; all judgments will fail");
        }
    }

    /// Backends to try, in order.
    pub fn chain(&self) -> Vec<Arc<dyn JudgeBackend>> {
        let mut chain = Vec::with_capacity(2);
        if self.local_available
            && let Some(local) = &self.local
        {
            chain.push(Arc::clone(local));
        }
        if self.remote_available
            && let Some(remote) = &self.remote
        {
            chain.push(Arc::clone(remote));
        }
        chain
    }

    pub fn local_available(&self) -> bool {
        self.local_available
    }

    pub fn remote_available(&self) -> bool {
        self.remote_available
    }

    pub fn any_available(&self) -> bool {
        self.local_available || self.remote_available
    }
}

impl std::fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSet")
            .field("local_configured", &self.local.is_some())
            .field("remote_configured", &self.remote.is_some())
            .field("remote_fallback", &self.remote_fallback)
            .field("local_available", &self.local_available)
            .field("remote_available", &self.remote_available)
            .finish()
    }
}
