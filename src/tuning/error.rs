use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("invalid threshold bounds: min {min} must be <= max {max}, both within [0, 1]")]
    InvalidBounds { min: f32, max: f32 },

    #[error("{name} {value} is outside [{min}, {max}]")]
    ThresholdOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type TuningResult<T> = Result<T, TuningError>;
