//! Point-in-time observability snapshot.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::judge::JudgeMetricsSnapshot;
use crate::tuning::TunerSnapshot;

#[derive(Debug, Clone, Serialize)]
/// Counters and tuning state across the whole discriminator.
pub struct MetricsSnapshot {
    pub judge: JudgeMetricsSnapshot,
    pub cache_hit_rate: f64,
    /// Requests triaged per quality tier.
    pub tiers: BTreeMap<&'static str, u64>,
    pub tuning: TunerSnapshot,
    pub cache_entries: u64,
    pub cache_capacity: u64,
    pub local_backend_available: bool,
    pub remote_backend_available: bool,
}

impl MetricsSnapshot {
    /// Structured map for external reporting. Only key presence is stable.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
