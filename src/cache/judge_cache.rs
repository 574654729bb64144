//! Request-level judgment cache.
//!
//! Keyed by the BLAKE3 hash of the normalized input plus the intent code. Entries expire
//! a fixed TTL after they are written and the cache is size-bounded (TinyLFU eviction);
//! both are enforced by `moka`, which also keeps reads lock-free under concurrent inserts.

use moka::sync::Cache;
use std::time::{Duration, Instant};

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
use crate::hashing::hash_input;
use crate::judge::Judgment;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// `(normalized input hash, intent code)`.
pub struct JudgeCacheKey {
    input_hash: [u8; 32],
    intent_code: String,
}

impl JudgeCacheKey {
    /// Builds a key from raw input; normalization happens inside [`hash_input`].
    pub fn new(input: &str, intent_code: &str) -> Self {
        Self::from_hash(hash_input(input), intent_code)
    }

    pub fn from_hash(input_hash: [u8; 32], intent_code: &str) -> Self {
        Self {
            input_hash,
            intent_code: intent_code.to_string(),
        }
    }

    #[inline]
    pub fn input_hash(&self) -> &[u8; 32] {
        &self.input_hash
    }

    #[inline]
    pub fn intent_code(&self) -> &str {
        &self.intent_code
    }
}

#[derive(Debug, Clone)]
/// A stored judgment plus its write time.
pub struct CacheEntry {
    pub judgment: Judgment,
    pub written_at: Instant,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.written_at.elapsed()
    }
}

/// Bounded, time-expiring store of successful judgments.
///
/// Cloning is cheap and clones share the same underlying storage.
#[derive(Clone)]
pub struct JudgeCache {
    entries: Cache<JudgeCacheKey, CacheEntry>,
    capacity: u64,
    ttl: Duration,
}

impl JudgeCache {
    /// Creates a cache with default capacity and TTL.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_CACHE_CAPACITY,
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn with_config(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            capacity,
            ttl,
        }
    }

    /// Returns the stored judgment, if present and not expired.
    #[inline]
    pub fn get(&self, key: &JudgeCacheKey) -> Option<Judgment> {
        self.entries.get(key).map(|entry| entry.judgment)
    }

    /// Returns the full entry (judgment plus write time).
    #[inline]
    pub fn get_entry(&self, key: &JudgeCacheKey) -> Option<CacheEntry> {
        self.entries.get(key)
    }

    /// Stores a judgment, replacing any entry under the same key.
    ///
    /// Failed judgments are refused; returns `false` when nothing was written.
    pub fn insert(&self, key: JudgeCacheKey, judgment: Judgment) -> bool {
        if !judgment.is_successful() {
            return false;
        }

        self.entries.insert(
            key,
            CacheEntry {
                judgment,
                written_at: Instant::now(),
            },
        );
        true
    }

    #[inline]
    pub fn remove(&self, key: &JudgeCacheKey) -> Option<Judgment> {
        self.entries.remove(key).map(|entry| entry.judgment)
    }

    #[inline]
    pub fn contains(&self, key: &JudgeCacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Approximate entry count (moka updates it lazily; see [`Self::run_pending_tasks`]).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs pending eviction/expiry maintenance.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for JudgeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JudgeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeCache")
            .field("entries", &self.entries.entry_count())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}
