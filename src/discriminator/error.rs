use thiserror::Error;

use crate::config::ConfigError;
use crate::judge::JudgeError;

/// Errors raised while assembling a [`Discriminator`](super::Discriminator).
#[derive(Debug, Error)]
pub enum DiscriminatorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("judge backend setup failed: {0}")]
    Backend(#[from] JudgeError),
}

pub type DiscriminatorResult<T> = Result<T, DiscriminatorError>;
