//! Intent candidate discriminator.
//!
//! Given a user utterance and a shortlist of candidate intent codes from an upstream
//! matcher, decides which candidates are plausible enough to keep before downstream
//! resolution.
//!
//! # Public API Surface
//!
//! ## Entry point
//! - [`Discriminator`] - Owns every shared piece and exposes `prune`, `score_all`,
//!   `record_outcome` and the admin operations
//! - [`Config`], [`ConfigError`] - `DISCRIMINATOR_*` environment configuration
//!
//! ## Components
//! - [`InputQualityValidator`], [`InputQuality`] - Input triage
//! - [`DiscriminatorJudge`], [`JudgeBackend`], [`Judgment`] - Per-pair judging
//! - [`JudgeCache`] - TTL + size bounded judgment cache
//! - [`BatchPruner`], [`PruneReport`] - Deadline-bounded batch scoring and pruning
//! - [`AutoTuner`], [`TuningConfig`] - Mis-prune feedback loop over the live threshold
//!
//! ## Test/Mock Support
//! [`ScriptedBackend`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod discriminator;
pub mod hashing;
pub mod judge;
pub mod metrics;
pub mod pruning;
pub mod tuning;
pub mod validation;

pub use cache::{CacheEntry, JudgeCache, JudgeCacheKey};
pub use config::{Config, ConfigError};
pub use discriminator::{Discriminator, DiscriminatorError, DiscriminatorResult};
pub use hashing::{hash_input, hash_to_u64, normalize_for_key};
#[cfg(any(test, feature = "mock"))]
pub use judge::ScriptedBackend;
pub use judge::{
    BackendKind, BackendSet, DiscriminatorJudge, IntentMetadataSource, JudgeBackend,
    JudgeError, JudgeMetrics, JudgeMetricsSnapshot, JudgeRequest, Judgment,
    LocalBackendConfig, LocalClassifierBackend, PromptMode, PromptTemplate,
    RemoteBackendConfig, RemoteChatBackend, StaticIntentCatalog, Verdict, parse_verdict,
};
pub use metrics::MetricsSnapshot;
pub use pruning::{BatchPruner, PruneReport, PrunerConfig, ScoredCandidate};
pub use tuning::{
    Adjustment, AdjustmentDirection, AutoTuner, IntentStats, OutcomeRecord, TunerSnapshot,
    TuningConfig, TuningError, TuningResult, TuningSettings,
};
pub use validation::{
    InputQuality, InputQualityValidator, KeywordSets, ValidationResult, ValidatorConfig,
};
