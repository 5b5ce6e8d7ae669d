//! Request and Response models for the price API
//!
//! This module defines the DTOs used for query parsing, cached payloads and
//! JSON response bodies.

pub mod course;
pub mod plan;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use course::{Course, CourseSearchResults};
pub use plan::{Plan, PriceSource, SortOrder};
pub use requests::{
    CalendarQuery, CourseSearchQuery, SearchQuery, COURSES_PER_PAGE, DEFAULT_CALENDAR_DAYS,
    MAX_CALENDAR_DAYS,
};
pub use responses::{
    CacheStatsResponse, CacheStatsSnapshot, CalendarDay, CalendarPayload, ErrorResponse,
    HealthResponse, SearchResults,
};
