//! TTL Store Module
//!
//! Process-wide map from string keys to expiring payloads. Expired entries
//! are removed lazily, by the first `get` that observes them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};

#[derive(Debug)]
struct StoreInner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    stats: CacheStats,
}

// == TTL Store ==
/// Thread-safe key/value store with per-entry expiry.
///
/// `get` and `set` never fail and never block on anything but the internal
/// mutex. The backing map is private; every read and write goes through the
/// methods below.
#[derive(Debug)]
pub struct TtlStore<T> {
    inner: Mutex<StoreInner<T>>,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
}

impl<T: Clone> TtlStore<T> {
    // == Constructor ==
    /// Creates an empty store whose entries live for `default_ttl` unless
    /// told otherwise.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            default_ttl,
        }
    }

    // Every mutation is a single map operation, so a panic elsewhere can't
    // leave the map half-written and a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, StoreInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The payload to store
    /// * `ttl` - Lifetime of the entry (uses the store default if None)
    pub fn set(&self, key: impl Into<String>, value: T, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));

        let mut inner = self.lock();
        inner.entries.insert(key.into(), entry);
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
    }

    // == Get ==
    /// Returns a copy of the payload stored under `key` if it is still live.
    ///
    /// An expired entry is removed from the map and reported as absent.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut inner = self.lock();
        let now = Instant::now();

        let expired = match inner.entries.get(key) {
            None => {
                inner.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            inner.entries.remove(key);
            let len = inner.entries.len();
            inner.stats.record_expirations(1);
            inner.stats.set_total_entries(len);
            inner.stats.record_miss();
            debug!(key, "dropped expired cache entry");
            return None;
        }

        inner.stats.record_hit();
        inner.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were removed.
    ///
    /// Lookups already hide expired entries, so calling this only reclaims
    /// memory.
    pub fn purge_expired(&self) -> usize {
        let mut inner = self.lock();
        let now = Instant::now();

        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        let len = inner.entries.len();
        let removed = before - len;

        inner.stats.record_expirations(removed);
        inner.stats.set_total_entries(len);
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    /// Number of entries physically held, including expired entries that no
    /// lookup has observed yet.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}
