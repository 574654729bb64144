//! Batch candidate pruning.
//!
//! [`BatchPruner`] turns an utterance plus a shortlist of intent codes into the subset
//! worth resolving downstream. Judging runs per candidate (concurrently by default) under
//! one batch deadline; late, failed, or unjudged candidates score 0.0 and never fail the
//! batch.

pub mod pruner;
pub mod types;

#[cfg(test)]
mod tests;

pub use pruner::BatchPruner;
pub use types::{PruneReport, PrunerConfig, ScoredCandidate};
