use thiserror::Error;

use super::types::BackendKind;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("no judge backend available")]
    BackendUnavailable,

    #[error("{kind} backend failed: {reason}")]
    Backend { kind: BackendKind, reason: String },

    #[error("failed to load local classifier: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("local classifier inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid judge configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for JudgeError {
    fn from(err: candle_core::Error) -> Self {
        JudgeError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for JudgeError {
    fn from(err: std::io::Error) -> Self {
        JudgeError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
