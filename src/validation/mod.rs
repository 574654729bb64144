//! Input-quality triage.
//!
//! [`InputQualityValidator::validate`] cleans a raw utterance and assigns it one
//! [`InputQuality`] tier, checked in priority order with the first match winning:
//! `INVALID`, `TOO_SHORT`, `VAGUE`, `IRRELEVANT`, `WRITE_OP`, then `GOOD`.
//!
//! Only `GOOD` and `WRITE_OP` are valid for judging. Rejected tiers are first-class
//! outcomes, not errors; callers branch on the tier.

pub mod config;
pub mod types;
pub mod validator;


pub use config::{KeywordSets, ValidatorConfig};
pub use types::{InputQuality, ValidationResult};
pub use validator::InputQualityValidator;
