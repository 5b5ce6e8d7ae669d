//! Cache Module
//!
//! In-memory TTL caches for search pages and course price calendars, plus
//! the key normalization each one uses.

mod calendar;
mod entry;
mod search;
mod stats;
mod store;


// Re-export public types
pub use calendar::{calendar_cache_key, CalendarCache, DEFAULT_CALENDAR_TTL};
pub use entry::CacheEntry;
pub use search::{SearchCache, SearchCacheKey, SearchParams, DEFAULT_SEARCH_TTL};
pub use stats::CacheStats;
pub use store::TtlStore;
