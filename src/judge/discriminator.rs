use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::backend::{BackendSet, JudgeRequest};
use super::error::JudgeError;
use super::metadata::{IntentMetadataSource, StaticIntentCatalog};
use super::metrics::{JudgeMetrics, JudgeMetricsSnapshot};
use super::prompt::PromptTemplate;
use super::types::Judgment;
use super::verdict::parse_verdict;
use crate::cache::{JudgeCache, JudgeCacheKey};
use crate::hashing::hash_to_u64;

/// Judges one `(input, intent)` pair: cache first, then local backend, then remote.
pub struct DiscriminatorJudge {
    cache: JudgeCache,
    backends: RwLock<BackendSet>,
    template: PromptTemplate,
    metadata: Arc<dyn IntentMetadataSource>,
    metrics: Arc<JudgeMetrics>,
}

impl std::fmt::Debug for DiscriminatorJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscriminatorJudge")
            .field("cache", &self.cache)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

impl DiscriminatorJudge {
    pub fn new(cache: JudgeCache, backends: BackendSet, template: PromptTemplate) -> Self {
        Self {
            cache,
            backends: RwLock::new(backends),
            template,
            metadata: Arc::new(StaticIntentCatalog::new()),
            metrics: Arc::new(JudgeMetrics::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn IntentMetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<JudgeMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Judges `input` against `intent_code`, describing the intent from the metadata source.
    pub async fn judge_intent(&self, input: &str, intent_code: &str) -> Judgment {
        let description = self.metadata.describe_or_code(intent_code);
        self.judge(input, intent_code, &description).await
    }

    /// Never fails: backend errors come back as a [`Judgment`] with `error` set.
    #[instrument(skip(self, input, intent_description), fields(input_hash = hash_to_u64(input.as_bytes())))]
    pub async fn judge(&self, input: &str, intent_code: &str, intent_description: &str) -> Judgment {
        self.metrics.record_call();

        let key = JudgeCacheKey::new(input, intent_code);
        if let Some(hit) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            debug!(intent = %intent_code, score = hit.score, "Judge cache hit");
            return hit.as_cached();
        }

        let started = Instant::now();
        let chain = self.backends.read().await.chain();
        if chain.is_empty() {
            self.metrics.record_error();
            return Judgment::failed(
                intent_code,
                JudgeError::BackendUnavailable.to_string(),
                started.elapsed(),
            );
        }

        let request = JudgeRequest {
            prompt: self.template.render(input, intent_code, intent_description),
            input: input.to_string(),
            intent_code: intent_code.to_string(),
            intent_description: intent_description.to_string(),
        };

        let mut last_error = None;
        for (attempt, backend) in chain.iter().enumerate() {
            let kind = backend.kind();
            if attempt > 0 {
                self.metrics.record_fallback();
                debug!(intent = %intent_code, backend = %kind, "Falling back to next judge backend");
            }
            self.metrics.record_backend(kind);

            match backend.invoke(&request).await {
                Ok(output) => {
                    let verdict = parse_verdict(&output);
                    if verdict.ambiguous {
                        self.metrics.record_ambiguous();
                        debug!(intent = %intent_code, output = %output, "Ambiguous judge output, treating as no-match");
                    }

                    let judgment = Judgment::success(
                        intent_code,
                        verdict.is_match,
                        verdict.score,
                        output,
                        kind,
                        started.elapsed(),
                    );
                    self.cache.insert(key, judgment.clone());

                    debug!(
                        intent = %intent_code,
                        backend = %kind,
                        is_match = judgment.is_match,
                        score = judgment.score,
                        latency_ms = judgment.latency.as_millis() as u64,
                        "Judged candidate"
                    );
                    return judgment;
                }
                Err(e) => {
                    warn!(intent = %intent_code, backend = %kind, error = %e, "Judge backend failed");
                    last_error = Some(e);
                }
            }
        }

        self.metrics.record_error();
        let error = last_error.unwrap_or(JudgeError::BackendUnavailable);
        Judgment::failed(intent_code, error.to_string(), started.elapsed())
    }

    /// Re-probes backend availability.
    pub async fn reinitialize_backends(&self) {
        self.backends.write().await.reinitialize().await;
    }

    pub async fn any_backend_available(&self) -> bool {
        self.backends.read().await.any_available()
    }

    pub async fn local_backend_available(&self) -> bool {
        self.backends.read().await.local_available()
    }

    pub async fn remote_backend_available(&self) -> bool {
        self.backends.read().await.remote_available()
    }

    pub fn cache(&self) -> &JudgeCache {
        &self.cache
    }

    pub fn metrics(&self) -> JudgeMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}
