use serde::Serialize;
use std::time::Duration;

use crate::constants::{DEFAULT_BATCH_TIMEOUT_MS, DEFAULT_MIN_KEEP_CANDIDATES};
use crate::validation::{InputQuality, ValidationResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunerConfig {
    /// Wall-clock budget for judging one batch.
    pub batch_timeout: Duration,
    /// Floor on the number of candidates returned by `prune`.
    pub min_keep_candidates: usize,
    /// Judge candidates as concurrent tasks instead of one after another.
    pub concurrent: bool,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            batch_timeout: Duration::from_millis(DEFAULT_BATCH_TIMEOUT_MS),
            min_keep_candidates: DEFAULT_MIN_KEEP_CANDIDATES,
            concurrent: true,
        }
    }
}

impl PrunerConfig {
    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = timeout;
        self
    }

    pub fn with_min_keep(mut self, min_keep: usize) -> Self {
        self.min_keep_candidates = min_keep;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.concurrent = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One candidate after judging and tier adjustment.
pub struct ScoredCandidate {
    pub intent_code: String,
    /// Position in the caller's candidate list.
    pub position: usize,
    /// Judge score times the tier's confidence modifier.
    pub score: f32,
    /// Judge score before the modifier; 0.0 when not judged.
    pub raw_score: f32,
    pub judged: bool,
    pub cached: bool,
    pub timed_out: bool,
    pub error: Option<String>,
}

impl ScoredCandidate {
    pub(crate) fn unjudged(intent_code: &str, position: usize) -> Self {
        Self {
            intent_code: intent_code.to_string(),
            position,
            score: 0.0,
            raw_score: 0.0,
            judged: false,
            cached: false,
            timed_out: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Full account of one `prune` call.
pub struct PruneReport {
    pub validation: ValidationResult,
    /// Threshold the scores were compared against.
    pub threshold: f32,
    /// `true` when too few candidates cleared the threshold and the top ones were kept
    /// regardless.
    pub floor_applied: bool,
    /// Every candidate, best score first; ties keep input order.
    pub candidates: Vec<ScoredCandidate>,
    /// Intent codes kept, in ranked order.
    pub kept: Vec<String>,
    /// Intent codes still pending when the batch deadline passed.
    pub timed_out: Vec<String>,
}

impl PruneReport {
    pub fn quality(&self) -> InputQuality {
        self.validation.quality
    }

    pub fn score_of(&self, intent_code: &str) -> Option<f32> {
        self.candidates
            .iter()
            .find(|c| c.intent_code == intent_code)
            .map(|c| c.score)
    }
}
