//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::upstream::{GORA_COURSE_SEARCH_URL, GORA_PLAN_SEARCH_URL};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in seconds for cached search pages
    pub search_cache_ttl: u64,
    /// Default TTL in seconds for cached course calendars
    pub calendar_cache_ttl: u64,
    /// Interval in seconds of the expired-entry sweep, 0 = lazy expiry only
    pub sweep_interval: u64,
    /// Pause in milliseconds between the per-day upstream calls of a calendar
    pub calendar_request_interval_ms: u64,
    /// Rakuten application id used by the GORA client
    pub rakuten_app_id: Option<String>,
    /// GORA plan search endpoint
    pub gora_plan_search_url: String,
    /// GORA course search endpoint
    pub gora_course_search_url: String,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SEARCH_CACHE_TTL` - Search cache TTL in seconds (default: 300)
    /// - `CALENDAR_CACHE_TTL` - Calendar cache TTL in seconds (default: 600)
    /// - `SWEEP_INTERVAL` - Expired-entry sweep in seconds (default: 0, disabled)
    /// - `CALENDAR_REQUEST_INTERVAL_MS` - Delay between calendar calls (default: 1100)
    /// - `RAKUTEN_APP_ID` - Rakuten application id (no default)
    /// - `GORA_PLAN_SEARCH_URL` - Plan search endpoint override
    /// - `GORA_COURSE_SEARCH_URL` - Course search endpoint override
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            search_cache_ttl: env_or("SEARCH_CACHE_TTL", defaults.search_cache_ttl),
            calendar_cache_ttl: env_or("CALENDAR_CACHE_TTL", defaults.calendar_cache_ttl),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            calendar_request_interval_ms: env_or(
                "CALENDAR_REQUEST_INTERVAL_MS",
                defaults.calendar_request_interval_ms,
            ),
            rakuten_app_id: env::var("RAKUTEN_APP_ID")
                .ok()
                .filter(|id| !id.trim().is_empty()),
            gora_plan_search_url: env::var("GORA_PLAN_SEARCH_URL")
                .unwrap_or(defaults.gora_plan_search_url),
            gora_course_search_url: env::var("GORA_COURSE_SEARCH_URL")
                .unwrap_or(defaults.gora_course_search_url),
        }
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_cache_ttl)
    }

    pub fn calendar_ttl(&self) -> Duration {
        Duration::from_secs(self.calendar_cache_ttl)
    }

    pub fn calendar_request_interval(&self) -> Duration {
        Duration::from_millis(self.calendar_request_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            search_cache_ttl: 300,
            calendar_cache_ttl: 600,
            sweep_interval: 0,
            calendar_request_interval_ms: 1100,
            rakuten_app_id: None,
            gora_plan_search_url: GORA_PLAN_SEARCH_URL.to_string(),
            gora_course_search_url: GORA_COURSE_SEARCH_URL.to_string(),
        }
    }
}
