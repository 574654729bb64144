use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
/// Which backend produced a judgment.
pub enum BackendKind {
    /// In-process sequence classifier.
    Local,
    /// Remote chat-completion model.
    Remote,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Verdict for one `(input, intent)` pair.
///
/// A judgment with `error` set always has `is_match == false` and `score == 0.0`, and is
/// never cached.
pub struct Judgment {
    pub intent_code: String,
    pub is_match: bool,
    /// Score in `[0, 1]`.
    pub score: f32,
    /// Backend output as received (diagnostic only).
    pub raw_output: String,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    /// Served from the judge cache rather than computed.
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
    pub backend: Option<BackendKind>,
    pub error: Option<String>,
}

impl Judgment {
    pub fn success(
        intent_code: impl Into<String>,
        is_match: bool,
        score: f32,
        raw_output: impl Into<String>,
        backend: BackendKind,
        latency: Duration,
    ) -> Self {
        Self {
            intent_code: intent_code.into(),
            is_match,
            score: score.clamp(0.0, 1.0),
            raw_output: raw_output.into(),
            latency,
            cached: false,
            timestamp: Utc::now(),
            backend: Some(backend),
            error: None,
        }
    }

    pub fn failed(intent_code: impl Into<String>, error: impl Into<String>, latency: Duration) -> Self {
        Self {
            intent_code: intent_code.into(),
            is_match: false,
            score: 0.0,
            raw_output: String::new(),
            latency,
            cached: false,
            timestamp: Utc::now(),
            backend: None,
            error: Some(error.into()),
        }
    }

    /// `true` when no error occurred.
    pub fn is_successful(&self) -> bool {
        self.error.is_none()
    }

    /// Copy marked as a cache hit, with zero latency.
    pub fn as_cached(&self) -> Self {
        Self {
            cached: true,
            latency: Duration::ZERO,
            ..self.clone()
        }
    }
}

fn serialize_millis<S>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(latency.as_millis() as u64)
}
