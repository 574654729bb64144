use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Hindsight feedback on one pruning decision.
pub struct OutcomeRecord {
    /// Diagnostic only.
    pub input: String,
    pub intent_code: String,
    /// Score at judgment time.
    pub score: f32,
    pub was_pruned: bool,
    pub was_correct_answer: bool,
    pub timestamp: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(
        input: impl Into<String>,
        intent_code: impl Into<String>,
        score: f32,
        was_pruned: bool,
        was_correct_answer: bool,
    ) -> Self {
        Self {
            input: input.into(),
            intent_code: intent_code.into(),
            score,
            was_pruned,
            was_correct_answer,
            timestamp: Utc::now(),
        }
    }

    /// The correct answer was discarded (a mis-prune).
    #[inline]
    pub fn pruned_correct_answer(&self) -> bool {
        self.was_pruned && self.was_correct_answer
    }

    /// A wrong answer was discarded (a correct prune).
    #[inline]
    pub fn pruned_incorrect_answer(&self) -> bool {
        self.was_pruned && !self.was_correct_answer
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Lifetime aggregate for one intent. Never shrinks except on reset.
pub struct IntentStats {
    pub count: u64,
    pub mis_prunes: u64,
    pub correct_prunes: u64,
    /// Outcomes that contributed to the score aggregates; non-finite scores are skipped.
    pub scored: u64,
    /// Mean of scores clamped to `[0, 1]`.
    pub mean_score: f64,
    pub min_score: f32,
    pub max_score: f32,
}

impl Default for IntentStats {
    fn default() -> Self {
        Self {
            count: 0,
            mis_prunes: 0,
            correct_prunes: 0,
            scored: 0,
            mean_score: 0.0,
            min_score: f32::INFINITY,
            max_score: f32::NEG_INFINITY,
        }
    }
}

impl IntentStats {
    pub fn record(&mut self, outcome: &OutcomeRecord) {
        self.count += 1;
        if outcome.pruned_correct_answer() {
            self.mis_prunes += 1;
        }
        if outcome.pruned_incorrect_answer() {
            self.correct_prunes += 1;
        }

        if !outcome.score.is_finite() {
            return;
        }
        let score = outcome.score.clamp(0.0, 1.0);
        self.scored += 1;
        self.mean_score += (score as f64 - self.mean_score) / self.scored as f64;
        self.min_score = self.min_score.min(score);
        self.max_score = self.max_score.max(score);
    }

    pub fn mis_prune_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mis_prunes as f64 / self.count as f64
        }
    }
}
