//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::tuning::TuningError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A threshold or rate variable could not be parsed as a number.
    #[error("failed to parse {name}='{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// `DISCRIMINATOR_PROMPT_MODE` names no known template.
    #[error("invalid prompt mode '{value}': expected zero-shot or few-shot")]
    InvalidPromptMode { value: String },

    /// A count that must be positive was zero.
    #[error("{name} must be greater than 0")]
    ZeroValue { name: &'static str },

    /// Thresholds, bounds or tuning parameters are inconsistent.
    #[error(transparent)]
    Tuning(#[from] TuningError),

    /// Local backend settings are unusable.
    #[error("invalid local backend config: {reason}")]
    InvalidLocalBackend { reason: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
