//! The assembled discriminator.
//!
//! [`Discriminator`] owns one instance of every shared piece (judge cache, judge counters,
//! live thresholds, tuner window) and hands them to the components that need them.
//! Nothing is process-global: two `Discriminator`s never share state.

pub mod error;


pub use error::{DiscriminatorError, DiscriminatorResult};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::cache::JudgeCache;
use crate::config::{Config, ConfigError};
use crate::judge::{
    BackendSet, DiscriminatorJudge, IntentMetadataSource, JudgeBackend, Judgment,
    LocalClassifierBackend, PromptTemplate, RemoteChatBackend, StaticIntentCatalog,
};
use crate::metrics::MetricsSnapshot;
use crate::pruning::{BatchPruner, PruneReport};
use crate::tuning::{Adjustment, AutoTuner, OutcomeRecord, TuningConfig};
use crate::validation::InputQualityValidator;

pub struct Discriminator {
    config: Config,
    judge: Arc<DiscriminatorJudge>,
    tuner: AutoTuner,
    pruner: BatchPruner,
}

impl std::fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discriminator")
            .field("judge", &self.judge)
            .field("tuner", &self.tuner)
            .field("pruner", &self.pruner)
            .finish()
    }
}

impl Discriminator {
    /// Reads `DISCRIMINATOR_*` variables and builds the real backends.
    pub async fn from_env() -> DiscriminatorResult<Self> {
        Self::from_config(Config::from_env()?).await
    }

    /// Builds the local classifier and remote chat backends described by `config`.
    pub async fn from_config(config: Config) -> DiscriminatorResult<Self> {
        Self::from_config_with_metadata(config, Arc::new(StaticIntentCatalog::new())).await
    }

    pub async fn from_config_with_metadata(
        config: Config,
        metadata: Arc<dyn IntentMetadataSource>,
    ) -> DiscriminatorResult<Self> {
        config.validate()?;

        let local = LocalClassifierBackend::load(config.local.clone())?;
        let remote = RemoteChatBackend::new(config.remote.clone());

        Self::with_backends(
            config,
            Some(Arc::new(local) as Arc<dyn JudgeBackend>),
            Some(Arc::new(remote) as Arc<dyn JudgeBackend>),
            metadata,
        )
        .await
    }

    /// Builds with caller-supplied backends. The remote backend is used only when
    /// `config.remote.enabled` is set.
    pub async fn with_backends(
        config: Config,
        local: Option<Arc<dyn JudgeBackend>>,
        remote: Option<Arc<dyn JudgeBackend>>,
        metadata: Arc<dyn IntentMetadataSource>,
    ) -> DiscriminatorResult<Self> {
        config.validate()?;

        let cache = JudgeCache::with_config(config.cache_capacity, config.cache_ttl);
        let backends = BackendSet::initialize(local, remote, config.remote.enabled).await;
        let judge = Arc::new(
            DiscriminatorJudge::new(cache, backends, PromptTemplate::for_mode(config.prompt_mode))
                .with_metadata(metadata),
        );

        let tuning =
            Arc::new(TuningConfig::new(config.tuning.clone()).map_err(ConfigError::from)?);
        let tuner = AutoTuner::new(Arc::clone(&tuning));
        let pruner = BatchPruner::new(
            InputQualityValidator::new(config.validator.clone()),
            Arc::clone(&judge),
            tuning,
            config.pruner_config(),
        );

        info!(
            prune_threshold = config.tuning.prune_threshold,
            safe_mode_threshold = config.tuning.safe_mode_threshold,
            auto_tune = config.tuning.auto_tune_enabled,
            cache_capacity = config.cache_capacity,
            "Discriminator ready"
        );

        Ok(Self {
            config,
            judge,
            tuner,
            pruner,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn judge(&self) -> &Arc<DiscriminatorJudge> {
        &self.judge
    }

    pub fn tuner(&self) -> &AutoTuner {
        &self.tuner
    }

    pub fn tuning(&self) -> &Arc<TuningConfig> {
        self.tuner.config()
    }

    pub fn pruner(&self) -> &BatchPruner {
        &self.pruner
    }

    pub async fn prune(
        &self,
        input: &str,
        candidates: &[String],
        is_write_operation: bool,
    ) -> Vec<String> {
        self.pruner.prune(input, candidates, is_write_operation).await
    }

    pub async fn prune_detailed(
        &self,
        input: &str,
        candidates: &[String],
        is_write_operation: bool,
    ) -> PruneReport {
        self.pruner
            .prune_detailed(input, candidates, is_write_operation)
            .await
    }

    pub async fn score_all(&self, input: &str, candidates: &[String]) -> HashMap<String, f32> {
        self.pruner.score_all(input, candidates).await
    }

    /// Judges one pair directly, bypassing triage.
    pub async fn judge_intent(&self, input: &str, intent_code: &str) -> Judgment {
        self.judge.judge_intent(input, intent_code).await
    }

    pub fn record_outcome(&self, record: OutcomeRecord) -> Option<Adjustment> {
        self.tuner.record_outcome(record)
    }

    /// Manual threshold override, clamped to the configured bounds.
    pub fn set_threshold(&self, value: f32) -> f32 {
        self.tuner.set_threshold(value)
    }

    pub async fn metrics_snapshot(&self) -> MetricsSnapshot {
        let judge = self.judge.metrics();
        let cache = self.judge.cache();
        cache.run_pending_tasks();

        MetricsSnapshot {
            judge,
            cache_hit_rate: judge.cache_hit_rate(),
            tiers: self.pruner.tier_counts(),
            tuning: self.tuner.snapshot(),
            cache_entries: cache.len(),
            cache_capacity: cache.capacity(),
            local_backend_available: self.judge.local_backend_available().await,
            remote_backend_available: self.judge.remote_backend_available().await,
        }
    }

    /// Zeroes judge and tier counters. Tuning state is untouched.
    pub fn reset_metrics(&self) {
        self.judge.reset_metrics();
        self.pruner.reset_metrics();
        info!("Discriminator metrics reset");
    }

    /// Clears the outcome window and restores startup thresholds.
    pub fn reset_tuning(&self) {
        self.tuner.reset();
    }

    pub async fn reinitialize_backends(&self) {
        self.judge.reinitialize_backends().await;
    }

    pub fn clear_cache(&self) {
        self.judge.cache().clear();
    }
}
