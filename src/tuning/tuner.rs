use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::TuningConfig;
use super::outcome::{IntentStats, OutcomeRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    /// Too many correct answers pruned; threshold lowered.
    Decreased,
    /// Comfortably under target; threshold raised.
    Increased,
    /// Inside the dead zone, or already at the bound.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Result of one adjustment pass.
pub struct Adjustment {
    pub previous_threshold: f32,
    pub threshold: f32,
    pub mis_prune_rate: f64,
    pub window_len: usize,
    pub direction: AdjustmentDirection,
}

#[derive(Debug, Clone, Serialize)]
/// Read-only view of tuner state.
pub struct TunerSnapshot {
    pub total_records: u64,
    pub window_len: usize,
    pub window_capacity: usize,
    pub auto_tune_window: u64,
    pub mis_prunes: u64,
    pub correct_prunes: u64,
    /// Over the live window.
    pub mis_prune_rate: f64,
    /// Over every record since the last reset.
    pub lifetime_mis_prune_rate: f64,
    pub prune_threshold: f32,
    pub safe_mode_threshold: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub target_mis_prune_rate: f32,
    pub adjustments: u64,
    pub last_adjustment: Option<DateTime<Utc>>,
    pub per_intent: BTreeMap<String, IntentStats>,
}

#[derive(Debug, Default)]
struct TunerState {
    window: VecDeque<OutcomeRecord>,
    total_records: u64,
    mis_prunes: u64,
    correct_prunes: u64,
    per_intent: HashMap<String, IntentStats>,
    adjustments: u64,
    last_adjustment: Option<DateTime<Utc>>,
}

impl TunerState {
    fn window_mis_prune_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let mis_prunes = self
            .window
            .iter()
            .filter(|r| r.pruned_correct_answer())
            .count();
        mis_prunes as f64 / self.window.len() as f64
    }
}

/// Feedback-driven threshold controller.
///
/// Outcomes land in a bounded FIFO window (for the live mis-prune rate) and in
/// per-intent lifetime aggregates (for diagnostics). Every `auto_tune_window` records an
/// adjustment pass moves the shared prune threshold by one fixed step:
///
/// - rate above target: lower the threshold (prune less)
/// - rate below half the target: raise it (prune more)
/// - otherwise: leave it alone
pub struct AutoTuner {
    config: Arc<TuningConfig>,
    state: Mutex<TunerState>,
}

impl std::fmt::Debug for AutoTuner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AutoTuner")
            .field("config", &self.config)
            .field("window_len", &state.window.len())
            .field("total_records", &state.total_records)
            .finish()
    }
}

impl AutoTuner {
    pub fn new(config: Arc<TuningConfig>) -> Self {
        let capacity = config.settings().window_capacity;
        Self {
            config,
            state: Mutex::new(TunerState {
                window: VecDeque::with_capacity(capacity.min(1024)),
                ..Default::default()
            }),
        }
    }

    pub fn config(&self) -> &Arc<TuningConfig> {
        &self.config
    }

    /// Records one outcome; returns the adjustment if this record triggered a pass.
    pub fn record_outcome(&self, record: OutcomeRecord) -> Option<Adjustment> {
        let settings = self.config.settings();
        let mut state = self.state.lock();

        if record.pruned_correct_answer() {
            state.mis_prunes += 1;
            warn!(
                intent = %record.intent_code,
                score = record.score,
                input = %record.input,
                "Correct answer was pruned"
            );
        } else if record.pruned_incorrect_answer() {
            state.correct_prunes += 1;
        }

        state
            .per_intent
            .entry(record.intent_code.clone())
            .or_default()
            .record(&record);

        state.window.push_back(record);
        while state.window.len() > settings.window_capacity {
            state.window.pop_front();
        }

        state.total_records += 1;
        if settings.auto_tune_enabled && state.total_records % settings.auto_tune_window == 0 {
            Some(self.adjust(&mut state))
        } else {
            None
        }
    }

    /// Runs an adjustment pass immediately.
    pub fn auto_tune(&self) -> Adjustment {
        let mut state = self.state.lock();
        self.adjust(&mut state)
    }

    fn adjust(&self, state: &mut TunerState) -> Adjustment {
        let rate = state.window_mis_prune_rate();
        let target = self.config.target_mis_prune_rate() as f64;

        let (previous, threshold) = if rate > target {
            self.config.step_prune_threshold(-1)
        } else if rate < target / 2.0 {
            self.config.step_prune_threshold(1)
        } else {
            let current = self.config.prune_threshold();
            (current, current)
        };

        let direction = if threshold < previous {
            AdjustmentDirection::Decreased
        } else if threshold > previous {
            AdjustmentDirection::Increased
        } else {
            AdjustmentDirection::Unchanged
        };

        if direction == AdjustmentDirection::Unchanged {
            debug!(
                mis_prune_rate = rate,
                target_rate = target,
                threshold,
                "Auto-tune pass left threshold unchanged"
            );
        } else {
            state.adjustments += 1;
            state.last_adjustment = Some(Utc::now());
            info!(
                mis_prune_rate = rate,
                target_rate = target,
                previous,
                threshold,
                window_len = state.window.len(),
                "Auto-tune adjusted prune threshold"
            );
        }

        Adjustment {
            previous_threshold: previous,
            threshold,
            mis_prune_rate: rate,
            window_len: state.window.len(),
            direction,
        }
    }

    /// Admin override of the prune threshold (clamped to bounds). Returns the applied value.
    pub fn set_threshold(&self, value: f32) -> f32 {
        let (previous, applied) = self.config.set_prune_threshold(value);
        if applied != previous {
            let mut state = self.state.lock();
            state.adjustments += 1;
            state.last_adjustment = Some(Utc::now());
        }
        info!(previous, applied, "Prune threshold set manually");
        applied
    }

    /// Mis-prune rate over the live window.
    pub fn mis_prune_rate(&self) -> f64 {
        self.state.lock().window_mis_prune_rate()
    }

    pub fn window_len(&self) -> usize {
        self.state.lock().window.len()
    }

    pub fn total_records(&self) -> u64 {
        self.state.lock().total_records
    }

    pub fn intent_stats(&self, intent_code: &str) -> Option<IntentStats> {
        self.state.lock().per_intent.get(intent_code).cloned()
    }

    pub fn last_adjustment(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_adjustment
    }

    pub fn snapshot(&self) -> TunerSnapshot {
        let state = self.state.lock();
        let lifetime_mis_prune_rate = if state.total_records == 0 {
            0.0
        } else {
            state.mis_prunes as f64 / state.total_records as f64
        };
        let settings = self.config.settings();

        TunerSnapshot {
            total_records: state.total_records,
            window_len: state.window.len(),
            window_capacity: settings.window_capacity,
            auto_tune_window: settings.auto_tune_window,
            mis_prunes: state.mis_prunes,
            correct_prunes: state.correct_prunes,
            mis_prune_rate: state.window_mis_prune_rate(),
            lifetime_mis_prune_rate,
            prune_threshold: self.config.prune_threshold(),
            safe_mode_threshold: self.config.safe_mode_threshold(),
            min_threshold: self.config.min_threshold(),
            max_threshold: self.config.max_threshold(),
            target_mis_prune_rate: self.config.target_mis_prune_rate(),
            adjustments: state.adjustments,
            last_adjustment: state.last_adjustment,
            per_intent: state
                .per_intent
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Clears all state and restores startup thresholds. Tests and admin recovery only.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        *state = TunerState::default();
        self.config.reset();
        info!("Auto-tuner reset");
    }
}
