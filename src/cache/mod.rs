//! Judgment cache shared by all judge calls.

pub mod judge_cache;


pub use judge_cache::{CacheEntry, JudgeCache, JudgeCacheKey};
