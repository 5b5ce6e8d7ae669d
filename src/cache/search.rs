//! Search Cache Module
//!
//! Caches one page of filtered, sorted search results per distinct search.
//! The key is the JSON form of a fixed-shape record, so equivalent searches
//! (same fields, any construction order, padded keyword, omitted defaults)
//! land on the same entry.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, TtlStore};
use crate::models::{SearchResults, SortOrder};

/// Default lifetime of a cached search page.
pub const DEFAULT_SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

// == Search Params ==
/// Validated search parameters, as handed to the cache and the upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Play date, `YYYY-MM-DD`
    pub play_date: String,
    /// One or more GORA area codes, comma separated
    pub area_code: String,
    pub keyword: Option<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub lunch_only: Option<bool>,
    pub sort: Option<SortOrder>,
    /// Start hour bucket as understood by GORA, e.g. `"8"`
    pub start_time_zone: Option<String>,
}

// == Search Cache Key ==
/// Normalized form of a search request.
///
/// Every field is a string so the record serializes to the same JSON for
/// every semantically equal request, and parses back without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCacheKey {
    pub play_date: String,
    pub area_code: String,
    pub keyword: String,
    pub min_price: String,
    pub max_price: String,
    pub lunch_only: String,
    pub sort: String,
    pub start_time_zone: String,
    pub page: String,
}

impl SearchCacheKey {
    /// Normalizes `params` and `page` into a key record.
    pub fn new(params: &SearchParams, page: u32) -> Self {
        Self {
            play_date: params.play_date.clone(),
            area_code: params.area_code.clone(),
            keyword: params
                .keyword
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            min_price: params.min_price.map(|p| p.to_string()).unwrap_or_default(),
            max_price: params.max_price.map(|p| p.to_string()).unwrap_or_default(),
            lunch_only: match params.lunch_only {
                Some(true) => "1",
                Some(false) | None => "0",
            }
            .to_string(),
            sort: params.sort.unwrap_or_default().as_str().to_string(),
            start_time_zone: params.start_time_zone.clone().unwrap_or_default(),
            page: page.to_string(),
        }
    }

    /// Serializes the record into the string stored in the cache.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses a key produced by [`encode`](Self::encode).
    pub fn parse(key: &str) -> Option<Self> {
        serde_json::from_str(key).ok()
    }
}

// Fields are written in declaration order, so the encoding depends only on
// the record's values and `parse` reads back exactly what `encode` wrote.
impl fmt::Display for SearchCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// == Search Cache ==
/// Search results cache with its own dedicated store.
#[derive(Debug)]
pub struct SearchCache {
    store: TtlStore<SearchResults>,
}

impl SearchCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            store: TtlStore::new(default_ttl),
        }
    }

    /// Canonical cache key for a search page.
    pub fn key(params: &SearchParams, page: u32) -> String {
        SearchCacheKey::new(params, page).encode()
    }

    pub fn get(&self, key: &str) -> Option<SearchResults> {
        self.store.get(key)
    }

    /// Stores a successfully fetched page. `ttl` overrides the default.
    pub fn set(&self, key: impl Into<String>, results: SearchResults, ttl: Option<Duration>) {
        self.store.set(key, results, ttl);
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

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_TTL)
    }
}
