//! Response DTOs for the price API
//!
//! These are also the payloads stored in the caches, so a cache hit is
//! served by serializing the stored value as-is.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::models::Plan;

/// One page of search results (`GET /api/search`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub play_date: String,
    pub area_code: String,
    pub page: u32,
    /// Number of items on this page after filtering
    pub total: usize,
    pub items: Vec<Plan>,
}

/// Cheapest price for one day of a course calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    /// `YYYY-MM-DD`
    pub date: String,
    /// None when no plan was found or the day could not be fetched
    pub min_price: Option<u32>,
    pub reserve_url: Option<String>,
}

/// Price calendar for one course (`GET /api/courses/:course_id/calendar`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPayload {
    pub course_id: u64,
    pub course_name: Option<String>,
    pub days: Vec<CalendarDay>,
}

/// Counters for one cache, as reported by `GET /api/cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsSnapshot {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub search: CacheStatsSnapshot,
    pub calendar: CacheStatsSnapshot,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// Upstream error code, when the upstream supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }
}
