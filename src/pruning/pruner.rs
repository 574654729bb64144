use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, instrument, warn};

use super::types::{PruneReport, PrunerConfig, ScoredCandidate};
use crate::judge::{DiscriminatorJudge, Judgment};
use crate::tuning::TuningConfig;
use crate::validation::{InputQuality, InputQualityValidator, ValidationResult};

/// Scores a shortlist of candidate intents and drops the implausible ones.
///
/// Per call: triage the input, judge every candidate against the cleaned input (unless
/// the tier rules it out), discount by the tier's confidence modifier, then keep what
/// clears the live threshold from [`TuningConfig`]. At least `min_keep_candidates`
/// always survive.
pub struct BatchPruner {
    validator: InputQualityValidator,
    judge: Arc<DiscriminatorJudge>,
    tuning: Arc<TuningConfig>,
    config: PrunerConfig,
    tier_counts: [AtomicU64; InputQuality::ALL.len()],
}

impl std::fmt::Debug for BatchPruner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPruner")
            .field("config", &self.config)
            .field("prune_threshold", &self.tuning.prune_threshold())
            .finish()
    }
}

/// Outcome of judging a batch, indexed like the caller's candidate list.
struct BatchScores {
    candidates: Vec<ScoredCandidate>,
    timed_out: Vec<String>,
}

impl BatchPruner {
    pub fn new(
        validator: InputQualityValidator,
        judge: Arc<DiscriminatorJudge>,
        tuning: Arc<TuningConfig>,
        config: PrunerConfig,
    ) -> Self {
        Self {
            validator,
            judge,
            tuning,
            config,
            tier_counts: Default::default(),
        }
    }

    pub fn config(&self) -> &PrunerConfig {
        &self.config
    }

    pub fn validator(&self) -> &InputQualityValidator {
        &self.validator
    }

    pub fn judge(&self) -> &Arc<DiscriminatorJudge> {
        &self.judge
    }

    /// Returns the surviving intent codes, best first.
    pub async fn prune(
        &self,
        input: &str,
        candidates: &[String],
        is_write_operation: bool,
    ) -> Vec<String> {
        self.prune_detailed(input, candidates, is_write_operation)
            .await
            .kept
    }

    #[instrument(skip(self, input, candidates), fields(candidates = candidates.len()))]
    pub async fn prune_detailed(
        &self,
        input: &str,
        candidates: &[String],
        is_write_operation: bool,
    ) -> PruneReport {
        let validation = self.triage(input);
        let threshold = self.tuning.threshold_for(is_write_operation);

        // A write utterance is only judged against candidates the caller marks as writes.
        let BatchScores {
            mut candidates,
            timed_out,
        } = self
            .score_candidates(&validation, candidates, is_write_operation)
            .await;

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut kept: Vec<String> = candidates
            .iter()
            .filter(|c| c.score >= threshold)
            .map(|c| c.intent_code.clone())
            .collect();

        let floor = self.config.min_keep_candidates.min(candidates.len());
        let floor_applied = kept.len() < floor;
        if floor_applied {
            kept = candidates
                .iter()
                .take(floor)
                .map(|c| c.intent_code.clone())
                .collect();
        }

        debug!(
            quality = %validation.quality,
            threshold,
            kept = kept.len(),
            floor_applied,
            "Pruned candidates"
        );

        PruneReport {
            validation,
            threshold,
            floor_applied,
            candidates,
            kept,
            timed_out,
        }
    }

    /// Tier-adjusted score per candidate, without thresholding.
    #[instrument(skip(self, input, candidates), fields(candidates = candidates.len()))]
    pub async fn score_all(&self, input: &str, candidates: &[String]) -> HashMap<String, f32> {
        let validation = self.triage(input);
        let scores = self.score_candidates(&validation, candidates, true).await;

        let mut out = HashMap::with_capacity(scores.candidates.len());
        for candidate in scores.candidates {
            out.entry(candidate.intent_code)
                .and_modify(|s: &mut f32| *s = s.max(candidate.score))
                .or_insert(candidate.score);
        }
        out
    }

    /// Requests triaged per quality tier since the last reset.
    pub fn tier_counts(&self) -> BTreeMap<&'static str, u64> {
        InputQuality::ALL
            .iter()
            .map(|q| (q.as_str(), self.tier_counts[q.index()].load(Ordering::Relaxed)))
            .collect()
    }

    pub fn reset_metrics(&self) {
        for counter in &self.tier_counts {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn triage(&self, input: &str) -> ValidationResult {
        let validation = self.validator.validate(input);
        self.tier_counts[validation.quality.index()].fetch_add(1, Ordering::Relaxed);
        validation
    }

    async fn score_candidates(
        &self,
        validation: &ValidationResult,
        candidates: &[String],
        judge_write_ops: bool,
    ) -> BatchScores {
        let judgeable = match validation.quality {
            InputQuality::Good => true,
            InputQuality::WriteOp => judge_write_ops,
            _ => false,
        };

        if !judgeable || candidates.is_empty() {
            debug!(
                quality = %validation.quality,
                reason = %validation.reason,
                "Input not judged, scoring all candidates 0.0"
            );
            return BatchScores {
                candidates: candidates
                    .iter()
                    .enumerate()
                    .map(|(i, code)| ScoredCandidate::unjudged(code, i))
                    .collect(),
                timed_out: Vec::new(),
            };
        }

        let deadline = Instant::now() + self.config.batch_timeout;
        let input = validation.cleaned_input.as_str();
        let judgments = if self.config.concurrent {
            self.judge_concurrent(input, candidates, deadline).await
        } else {
            self.judge_sequential(input, candidates, deadline).await
        };

        let modifier = validation.confidence_modifier();
        let mut scored = Vec::with_capacity(candidates.len());
        let mut timed_out = Vec::new();
        for (position, (code, slot)) in candidates.iter().zip(judgments).enumerate() {
            let mut candidate = ScoredCandidate::unjudged(code, position);
            match slot {
                Slot::Done(judgment) => {
                    candidate.judged = true;
                    candidate.cached = judgment.cached;
                    if judgment.is_successful() {
                        candidate.raw_score = judgment.score;
                        candidate.score = (judgment.score * modifier).clamp(0.0, 1.0);
                    } else {
                        candidate.error = judgment.error;
                    }
                }
                Slot::TimedOut => {
                    candidate.timed_out = true;
                    timed_out.push(code.clone());
                }
                Slot::Lost(reason) => candidate.error = Some(reason),
            }
            scored.push(candidate);
        }

        if !timed_out.is_empty() {
            warn!(
                timed_out = timed_out.len(),
                timeout_ms = self.config.batch_timeout.as_millis() as u64,
                "Batch deadline reached, pending candidates scored 0.0"
            );
        }

        BatchScores {
            candidates: scored,
            timed_out,
        }
    }

    async fn judge_concurrent(
        &self,
        input: &str,
        candidates: &[String],
        deadline: Instant,
    ) -> Vec<Slot> {
        let mut set = JoinSet::new();
        for (i, code) in candidates.iter().enumerate() {
            let judge = Arc::clone(&self.judge);
            let input = input.to_string();
            let code = code.clone();
            set.spawn(async move { (i, judge.judge_intent(&input, &code).await) });
        }

        let mut slots: Vec<Option<Slot>> = (0..candidates.len()).map(|_| None).collect();
        loop {
            match timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok((i, judgment)))) => slots[i] = Some(Slot::Done(judgment)),
                Ok(Some(Err(e))) => warn!(error = %e, "Judge task failed"),
                Ok(None) => break,
                Err(_) => {
                    set.abort_all();
                    return slots
                        .into_iter()
                        .map(|s| s.unwrap_or(Slot::TimedOut))
                        .collect();
                }
            }
        }

        slots
            .into_iter()
            .map(|s| s.unwrap_or_else(|| Slot::Lost("judge task failed".to_string())))
            .collect()
    }

    async fn judge_sequential(
        &self,
        input: &str,
        candidates: &[String],
        deadline: Instant,
    ) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(candidates.len());
        for code in candidates {
            if slots.last().is_some_and(|s| matches!(s, Slot::TimedOut)) {
                slots.push(Slot::TimedOut);
                continue;
            }
            match timeout_at(deadline, self.judge.judge_intent(input, code)).await {
                Ok(judgment) => slots.push(Slot::Done(judgment)),
                Err(_) => slots.push(Slot::TimedOut),
            }
        }
        slots
    }
}

enum Slot {
    Done(Judgment),
    TimedOut,
    /// Task panicked or was cancelled before the deadline.
    Lost(String),
}
