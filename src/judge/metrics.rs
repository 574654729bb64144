use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::BackendKind;

/// Process-wide judge counters. Monotonic until [`JudgeMetrics::reset`].
#[derive(Debug, Default)]
pub struct JudgeMetrics {
    total_calls: AtomicU64,
    cache_hits: AtomicU64,
    local_calls: AtomicU64,
    remote_calls: AtomicU64,
    fallbacks: AtomicU64,
    ambiguous_outputs: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JudgeMetricsSnapshot {
    pub total_calls: u64,
    pub cache_hits: u64,
    pub local_calls: u64,
    pub remote_calls: u64,
    pub fallbacks: u64,
    pub ambiguous_outputs: u64,
    pub errors: u64,
}

impl JudgeMetricsSnapshot {
    pub fn cache_hit_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_calls as f64
        }
    }
}

// Counters are independent; Relaxed is enough.
impl JudgeMetrics {
    pub fn record_call(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backend(&self, kind: BackendKind) {
        match kind {
            BackendKind::Local => self.local_calls.fetch_add(1, Ordering::Relaxed),
            BackendKind::Remote => self.remote_calls.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ambiguous(&self) {
        self.ambiguous_outputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> JudgeMetricsSnapshot {
        JudgeMetricsSnapshot {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            local_calls: self.local_calls.load(Ordering::Relaxed),
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            ambiguous_outputs: self.ambiguous_outputs.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Admin reset.
    pub fn reset(&self) {
        for counter in [
            &self.total_calls,
            &self.cache_hits,
            &self.local_calls,
            &self.remote_calls,
            &self.fallbacks,
            &self.ambiguous_outputs,
            &self.errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
