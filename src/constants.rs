//! Cross-cutting, shared constants.
//!
//! These are the defaults behind [`Config`](crate::config::Config). Runtime values always
//! come from the config; the constants exist so that modules agree on a single source.

pub const DEFAULT_PRUNE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_SAFE_MODE_THRESHOLD: f32 = 0.3;
pub const DEFAULT_MIN_THRESHOLD: f32 = 0.1;
pub const DEFAULT_MAX_THRESHOLD: f32 = 0.9;
pub const DEFAULT_ADJUSTMENT_STEP: f32 = 0.05;
pub const DEFAULT_TARGET_MIS_PRUNE_RATE: f32 = 0.05;

/// Records between two auto-tune passes.
pub const DEFAULT_AUTO_TUNE_WINDOW: u64 = 100;
/// Capacity of the outcome sliding window (independent of the auto-tune trigger).
pub const DEFAULT_OUTCOME_WINDOW_CAPACITY: usize = 10_000;
/// Upper bound accepted for the outcome window; the mis-prune rate re-scans it on every pass.
pub const MAX_OUTCOME_WINDOW_CAPACITY: usize = 1_000_000;

pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

pub const DEFAULT_BATCH_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MIN_KEEP_CANDIDATES: usize = 1;

/// Scores at or above this are a "match" when a backend emits a probability.
pub const MATCH_PROBABILITY_CUTOFF: f32 = 0.5;

pub const DEFAULT_MIN_INPUT_CHARS: usize = 2;
pub const DEFAULT_MAX_VAGUE_TOKENS: usize = 2;

pub const DEFAULT_LOCAL_MAX_SEQ_LEN: usize = 512;
pub const DEFAULT_REMOTE_MODEL: &str = "gpt-4o-mini";
