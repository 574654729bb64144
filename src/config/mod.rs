//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `DISCRIMINATOR_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_TIMEOUT_MS, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_MIN_KEEP_CANDIDATES,
};
use crate::judge::{LocalBackendConfig, PromptMode, RemoteBackendConfig};
use crate::pruning::PrunerConfig;
use crate::tuning::TuningSettings;
use crate::validation::ValidatorConfig;

/// Discriminator configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `DISCRIMINATOR_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial thresholds, bounds and auto-tune parameters.
    pub tuning: TuningSettings,

    /// Max entries in the judge cache. Default: `10_000`.
    pub cache_capacity: u64,

    /// Judge cache time-to-live from write. Default: 1 hour.
    pub cache_ttl: Duration,

    /// Wall-clock budget for judging one batch. Default: 5 s.
    pub batch_timeout: Duration,

    /// Minimum candidates `prune` returns. Default: `1`.
    pub min_keep_candidates: usize,

    /// Judge candidates concurrently. Default: `true`.
    pub concurrent_judging: bool,

    /// Prompt template. Default: zero-shot.
    pub prompt_mode: PromptMode,

    pub local: LocalBackendConfig,
    pub remote: RemoteBackendConfig,
    pub validator: ValidatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tuning: TuningSettings::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            batch_timeout: Duration::from_millis(DEFAULT_BATCH_TIMEOUT_MS),
            min_keep_candidates: DEFAULT_MIN_KEEP_CANDIDATES,
            concurrent_judging: true,
            prompt_mode: PromptMode::default(),
            local: LocalBackendConfig::default(),
            remote: RemoteBackendConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

impl Config {
    const ENV_PRUNE_THRESHOLD: &'static str = "DISCRIMINATOR_PRUNE_THRESHOLD";
    const ENV_SAFE_MODE_THRESHOLD: &'static str = "DISCRIMINATOR_SAFE_MODE_THRESHOLD";
    const ENV_SAFE_MODE_ENABLED: &'static str = "DISCRIMINATOR_SAFE_MODE_ENABLED";
    const ENV_MIN_THRESHOLD: &'static str = "DISCRIMINATOR_MIN_THRESHOLD";
    const ENV_MAX_THRESHOLD: &'static str = "DISCRIMINATOR_MAX_THRESHOLD";
    const ENV_ADJUSTMENT_STEP: &'static str = "DISCRIMINATOR_ADJUSTMENT_STEP";
    const ENV_TARGET_MIS_PRUNE_RATE: &'static str = "DISCRIMINATOR_TARGET_MIS_PRUNE_RATE";
    const ENV_AUTO_TUNE_ENABLED: &'static str = "DISCRIMINATOR_AUTO_TUNE_ENABLED";
    const ENV_AUTO_TUNE_WINDOW: &'static str = "DISCRIMINATOR_AUTO_TUNE_WINDOW";
    const ENV_OUTCOME_WINDOW_CAPACITY: &'static str = "DISCRIMINATOR_OUTCOME_WINDOW_CAPACITY";
    const ENV_CACHE_CAPACITY: &'static str = "DISCRIMINATOR_CACHE_CAPACITY";
    const ENV_CACHE_TTL_SECS: &'static str = "DISCRIMINATOR_CACHE_TTL_SECS";
    const ENV_BATCH_TIMEOUT_MS: &'static str = "DISCRIMINATOR_BATCH_TIMEOUT_MS";
    const ENV_MIN_KEEP_CANDIDATES: &'static str = "DISCRIMINATOR_MIN_KEEP_CANDIDATES";
    const ENV_CONCURRENT_JUDGING: &'static str = "DISCRIMINATOR_CONCURRENT_JUDGING";
    const ENV_PROMPT_MODE: &'static str = "DISCRIMINATOR_PROMPT_MODE";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// Unparseable thresholds and rates are errors; unparseable counts and durations fall
    /// back to their defaults. Call [`Config::validate`] before use.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let t = defaults.tuning;

        let tuning = TuningSettings {
            prune_threshold: Self::parse_f32_from_env(Self::ENV_PRUNE_THRESHOLD, t.prune_threshold)?,
            safe_mode_threshold: Self::parse_f32_from_env(
                Self::ENV_SAFE_MODE_THRESHOLD,
                t.safe_mode_threshold,
            )?,
            safe_mode_enabled: Self::parse_bool_from_env(
                Self::ENV_SAFE_MODE_ENABLED,
                t.safe_mode_enabled,
            ),
            min_threshold: Self::parse_f32_from_env(Self::ENV_MIN_THRESHOLD, t.min_threshold)?,
            max_threshold: Self::parse_f32_from_env(Self::ENV_MAX_THRESHOLD, t.max_threshold)?,
            adjustment_step: Self::parse_f32_from_env(Self::ENV_ADJUSTMENT_STEP, t.adjustment_step)?,
            target_mis_prune_rate: Self::parse_f32_from_env(
                Self::ENV_TARGET_MIS_PRUNE_RATE,
                t.target_mis_prune_rate,
            )?,
            auto_tune_enabled: Self::parse_bool_from_env(
                Self::ENV_AUTO_TUNE_ENABLED,
                t.auto_tune_enabled,
            ),
            auto_tune_window: Self::parse_u64_from_env(Self::ENV_AUTO_TUNE_WINDOW, t.auto_tune_window),
            window_capacity: Self::parse_u64_from_env(
                Self::ENV_OUTCOME_WINDOW_CAPACITY,
                t.window_capacity as u64,
            ) as usize,
        };

        let cache_capacity = Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);
        let cache_ttl = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_CACHE_TTL_SECS,
            defaults.cache_ttl.as_secs(),
        ));
        let batch_timeout = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_BATCH_TIMEOUT_MS,
            defaults.batch_timeout.as_millis() as u64,
        ));
        let min_keep_candidates = Self::parse_u64_from_env(
            Self::ENV_MIN_KEEP_CANDIDATES,
            defaults.min_keep_candidates as u64,
        ) as usize;
        let concurrent_judging =
            Self::parse_bool_from_env(Self::ENV_CONCURRENT_JUDGING, defaults.concurrent_judging);
        let prompt_mode = Self::parse_prompt_mode_from_env(defaults.prompt_mode)?;

        Ok(Self {
            tuning,
            cache_capacity,
            cache_ttl,
            batch_timeout,
            min_keep_candidates,
            concurrent_judging,
            prompt_mode,
            local: LocalBackendConfig::from_env(),
            remote: RemoteBackendConfig::from_env(),
            validator: ValidatorConfig::from_env(),
        })
    }

    /// Rejects structurally invalid settings. Does not load models.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()?;

        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroValue {
                name: "cache_capacity",
            });
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::ZeroValue { name: "cache_ttl" });
        }
        if self.batch_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: "batch_timeout",
            });
        }

        self.local
            .validate()
            .map_err(|reason| ConfigError::InvalidLocalBackend { reason })?;

        if let Some(ref path) = self.local.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Pruner settings carried by this config.
    pub fn pruner_config(&self) -> PrunerConfig {
        PrunerConfig {
            batch_timeout: self.batch_timeout,
            min_keep_candidates: self.min_keep_candidates,
            concurrent: self.concurrent_judging,
        }
    }

    fn parse_f32_from_env(var_name: &'static str, default: f32) -> Result<f32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_prompt_mode_from_env(default: PromptMode) -> Result<PromptMode, ConfigError> {
        match env::var(Self::ENV_PROMPT_MODE) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPromptMode { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name) {
            Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
            Err(_) => default,
        }
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
