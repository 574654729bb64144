use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use super::error::{TuningError, TuningResult};
use crate::constants::{
    DEFAULT_ADJUSTMENT_STEP, DEFAULT_AUTO_TUNE_WINDOW, DEFAULT_MAX_THRESHOLD,
    DEFAULT_MIN_THRESHOLD, DEFAULT_OUTCOME_WINDOW_CAPACITY, DEFAULT_PRUNE_THRESHOLD,
    DEFAULT_SAFE_MODE_THRESHOLD, DEFAULT_TARGET_MIS_PRUNE_RATE, MAX_OUTCOME_WINDOW_CAPACITY,
};

#[derive(Debug, Clone, PartialEq)]
/// Static startup values for [`TuningConfig`].
pub struct TuningSettings {
    pub prune_threshold: f32,
    pub safe_mode_threshold: f32,
    pub safe_mode_enabled: bool,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub adjustment_step: f32,
    pub target_mis_prune_rate: f32,
    pub auto_tune_enabled: bool,
    /// An adjustment pass runs every time this many outcomes have been recorded.
    pub auto_tune_window: u64,
    /// Capacity of the outcome sliding window used for the mis-prune rate.
    pub window_capacity: usize,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            safe_mode_threshold: DEFAULT_SAFE_MODE_THRESHOLD,
            safe_mode_enabled: true,
            min_threshold: DEFAULT_MIN_THRESHOLD,
            max_threshold: DEFAULT_MAX_THRESHOLD,
            adjustment_step: DEFAULT_ADJUSTMENT_STEP,
            target_mis_prune_rate: DEFAULT_TARGET_MIS_PRUNE_RATE,
            auto_tune_enabled: true,
            auto_tune_window: DEFAULT_AUTO_TUNE_WINDOW,
            window_capacity: DEFAULT_OUTCOME_WINDOW_CAPACITY,
        }
    }
}

impl TuningSettings {
    pub fn validate(&self) -> TuningResult<()> {
        let unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);

        if !unit(self.min_threshold) || !unit(self.max_threshold) || self.min_threshold > self.max_threshold {
            return Err(TuningError::InvalidBounds {
                min: self.min_threshold,
                max: self.max_threshold,
            });
        }

        for (name, value) in [
            ("prune_threshold", self.prune_threshold),
            ("safe_mode_threshold", self.safe_mode_threshold),
        ] {
            if !value.is_finite() || value < self.min_threshold || value > self.max_threshold {
                return Err(TuningError::ThresholdOutOfRange {
                    name,
                    value,
                    min: self.min_threshold,
                    max: self.max_threshold,
                });
            }
        }

        if !self.adjustment_step.is_finite() || self.adjustment_step <= 0.0 || self.adjustment_step > 1.0 {
            return Err(TuningError::InvalidParameter {
                name: "adjustment_step",
                reason: format!("must be in (0, 1], got {}", self.adjustment_step),
            });
        }

        if !unit(self.target_mis_prune_rate) {
            return Err(TuningError::InvalidParameter {
                name: "target_mis_prune_rate",
                reason: format!("must be in [0, 1], got {}", self.target_mis_prune_rate),
            });
        }

        if self.auto_tune_window == 0 {
            return Err(TuningError::InvalidParameter {
                name: "auto_tune_window",
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.window_capacity == 0 || self.window_capacity > MAX_OUTCOME_WINDOW_CAPACITY {
            return Err(TuningError::InvalidParameter {
                name: "window_capacity",
                reason: format!(
                    "must be in [1, {}], got {}",
                    MAX_OUTCOME_WINDOW_CAPACITY, self.window_capacity
                ),
            });
        }

        Ok(())
    }
}

/// Where the prune threshold sits on the adjustment grid: `base + steps * adjustment_step`.
///
/// The threshold is recomputed from this pair on every step, so a run of steps that
/// cancels out lands back on `base` exactly.
#[derive(Debug, Clone, Copy)]
struct StepGrid {
    base: f32,
    steps: i32,
}

impl StepGrid {
    fn at(base: f32) -> Self {
        Self { base, steps: 0 }
    }
}

/// Live, process-wide pruning thresholds.
///
/// Reads are lock-free atomic loads; writes are serialized by a mutex so that
/// read-modify-write adjustments never interleave. Thresholds stay within
/// `[min_threshold, max_threshold]`.
#[derive(Debug)]
pub struct TuningConfig {
    settings: TuningSettings,
    prune_threshold: AtomicU32,
    safe_mode_threshold: AtomicU32,
    write_lock: Mutex<StepGrid>,
}

impl TuningConfig {
    pub fn new(settings: TuningSettings) -> TuningResult<Self> {
        settings.validate()?;
        Ok(Self::from_valid(settings))
    }

    fn from_valid(settings: TuningSettings) -> Self {
        Self {
            prune_threshold: AtomicU32::new(settings.prune_threshold.to_bits()),
            safe_mode_threshold: AtomicU32::new(settings.safe_mode_threshold.to_bits()),
            write_lock: Mutex::new(StepGrid::at(settings.prune_threshold)),
            settings,
        }
    }

    #[inline]
    pub fn prune_threshold(&self) -> f32 {
        f32::from_bits(self.prune_threshold.load(Ordering::Acquire))
    }

    #[inline]
    pub fn safe_mode_threshold(&self) -> f32 {
        f32::from_bits(self.safe_mode_threshold.load(Ordering::Acquire))
    }

    /// Safe-mode threshold for write operations when enabled, else the prune threshold.
    #[inline]
    pub fn threshold_for(&self, is_write_operation: bool) -> f32 {
        if is_write_operation && self.settings.safe_mode_enabled {
            self.safe_mode_threshold()
        } else {
            self.prune_threshold()
        }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.settings.min_threshold, self.settings.max_threshold)
    }

    /// Sets the prune threshold (clamped). Returns `(previous, applied)`.
    ///
    /// The applied value becomes the new origin for [`step_prune_threshold`](Self::step_prune_threshold).
    pub fn set_prune_threshold(&self, value: f32) -> (f32, f32) {
        let mut grid = self.write_lock.lock();
        let previous = self.prune_threshold();
        let applied = if value.is_finite() { self.clamp(value) } else { previous };
        *grid = StepGrid::at(applied);
        self.prune_threshold
            .store(applied.to_bits(), Ordering::Release);
        (previous, applied)
    }

    /// Moves the prune threshold by `steps` multiples of `adjustment_step` (clamped).
    /// Returns `(previous, applied)`.
    ///
    /// Steps past a bound are not accumulated: one step back from a clamped bound
    /// always moves off it.
    pub fn step_prune_threshold(&self, steps: i32) -> (f32, f32) {
        let mut grid = self.write_lock.lock();
        let previous = self.prune_threshold();

        let step = self.settings.adjustment_step;
        let lowest = steps_to_bound(grid.base, self.settings.min_threshold, step, f64::floor);
        let highest = steps_to_bound(grid.base, self.settings.max_threshold, step, f64::ceil);
        grid.steps = grid.steps.saturating_add(steps).clamp(lowest, highest);

        let raw = grid.base as f64 + grid.steps as f64 * step as f64;
        let applied = self.clamp(raw as f32);
        self.prune_threshold
            .store(applied.to_bits(), Ordering::Release);
        (previous, applied)
    }

    /// Sets the safe-mode threshold (clamped). Returns `(previous, applied)`.
    pub fn set_safe_mode_threshold(&self, value: f32) -> (f32, f32) {
        let _guard = self.write_lock.lock();
        let previous = self.safe_mode_threshold();
        let applied = if value.is_finite() { self.clamp(value) } else { previous };
        self.safe_mode_threshold
            .store(applied.to_bits(), Ordering::Release);
        (previous, applied)
    }

    /// Restores both thresholds to their startup values.
    pub fn reset(&self) {
        let mut grid = self.write_lock.lock();
        *grid = StepGrid::at(self.settings.prune_threshold);
        self.prune_threshold
            .store(self.settings.prune_threshold.to_bits(), Ordering::Release);
        self.safe_mode_threshold
            .store(self.settings.safe_mode_threshold.to_bits(), Ordering::Release);
    }

    pub fn settings(&self) -> &TuningSettings {
        &self.settings
    }

    pub fn min_threshold(&self) -> f32 {
        self.settings.min_threshold
    }

    pub fn max_threshold(&self) -> f32 {
        self.settings.max_threshold
    }

    pub fn adjustment_step(&self) -> f32 {
        self.settings.adjustment_step
    }

    pub fn target_mis_prune_rate(&self) -> f32 {
        self.settings.target_mis_prune_rate
    }

    pub fn safe_mode_enabled(&self) -> bool {
        self.settings.safe_mode_enabled
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self::from_valid(TuningSettings::default())
    }
}

/// Number of grid steps from `base` to `bound`. A span within rounding error of a whole
/// number of steps counts as exactly that many; otherwise `round_out` picks the step
/// that first crosses the bound.
fn steps_to_bound(base: f32, bound: f32, step: f32, round_out: fn(f64) -> f64) -> i32 {
    let span = (bound as f64 - base as f64) / step as f64;
    let nearest = span.round();
    let steps = if (span - nearest).abs() < 1e-4 {
        nearest
    } else {
        round_out(span)
    };
    steps as i32
}
