//! Per-pair judging.
//!
//! [`DiscriminatorJudge`] answers "does this utterance mean this intent?" for one
//! `(input, intent)` pair. It consults the [`JudgeCache`](crate::cache::JudgeCache) first,
//! then walks the [`BackendSet`]: the local classifier when available, then the remote
//! chat model when fallback is enabled.
//!
//! Backend output is normalized by [`parse_verdict`]. Failures never escape as errors;
//! they come back as a [`Judgment`] with `error` set, scored 0.0 and never cached.

pub mod backend;
pub mod discriminator;
pub mod error;
pub mod local;
pub mod metadata;
pub mod metrics;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod prompt;
pub mod remote;
pub mod types;
pub mod verdict;

#[cfg(test)]
mod tests;

pub use backend::{BackendSet, JudgeBackend, JudgeRequest};
pub use discriminator::DiscriminatorJudge;
pub use error::JudgeError;
pub use local::{LocalBackendConfig, LocalClassifierBackend};
pub use metadata::{IntentMetadataSource, StaticIntentCatalog};
pub use metrics::{JudgeMetrics, JudgeMetricsSnapshot};
#[cfg(any(test, feature = "mock"))]
pub use mock::ScriptedBackend;
pub use prompt::{PromptMode, PromptTemplate};
pub use remote::{RemoteBackendConfig, RemoteChatBackend};
pub use types::{BackendKind, Judgment};
pub use verdict::{Verdict, parse_verdict};
