//! Feedback-driven auto-tuning of the pruning threshold.
//!
//! [`TuningConfig`] is the shared, live threshold object read by every prune call;
//! [`AutoTuner`] is the only writer in normal operation. The tuner keeps the fraction of
//! correct answers that get pruned near `target_mis_prune_rate` with a damped,
//! constant-step hysteresis loop.

pub mod config;
pub mod error;
pub mod outcome;
pub mod tuner;


pub use config::{TuningConfig, TuningSettings};
pub use error::{TuningError, TuningResult};
pub use outcome::{IntentStats, OutcomeRecord};
pub use tuner::{Adjustment, AdjustmentDirection, AutoTuner, TunerSnapshot};
