//! Calendar Cache Module
//!
//! Caches the per-course multi-day price calendar. Building one takes a
//! sequence of rate-limited upstream calls, so entries live longer than
//! search pages.

use std::time::Duration;

use crate::cache::{CacheStats, TtlStore};
use crate::models::CalendarPayload;

/// Default lifetime of a cached calendar.
pub const DEFAULT_CALENDAR_TTL: Duration = Duration::from_secs(10 * 60);

/// Key for the calendar of `course_id` over `days` days.
///
/// `days` never contains a `:`, so the last separator always splits the two
/// components and distinct pairs never share a key.
pub fn calendar_cache_key(course_id: &str, days: u32) -> String {
    format!("calendar:{}:{}", course_id, days)
}

// == Calendar Cache ==
/// Price calendar cache with its own dedicated store.
#[derive(Debug)]
pub struct CalendarCache {
    store: TtlStore<CalendarPayload>,
}

impl CalendarCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            store: TtlStore::new(default_ttl),
        }
    }

    pub fn key(course_id: &str, days: u32) -> String {
        calendar_cache_key(course_id, days)
    }

    pub fn get(&self, key: &str) -> Option<CalendarPayload> {
        self.store.get(key)
    }

    /// Stores a built calendar, including one with days marked unavailable.
    /// `ttl` overrides the default.
    pub fn set(&self, key: impl Into<String>, calendar: CalendarPayload, ttl: Option<Duration>) {
        self.store.set(key, calendar, ttl);
    }

    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for CalendarCache {
    fn default() -> Self {
        Self::new(DEFAULT_CALENDAR_TTL)
    }
}
