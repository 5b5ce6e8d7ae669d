//! Upstream Module
//!
//! The golf API the handlers fetch from: plan searches on a cache miss, and
//! course searches. Handlers only see the [`GolfSource`] trait, so tests can
//! swap the HTTP client for a stub.

mod gora;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CourseSearchResults, Plan};

pub use gora::{
    normalize_gora_courses, normalize_gora_items, GoraClient, GoraCourseItem, GoraItem,
    GoraPlanDetail, GORA_COURSE_SEARCH_URL, GORA_PLAN_SEARCH_URL,
};

/// Plans returned per upstream page.
pub const PLANS_PER_PAGE: u32 = 30;

// == Upstream Error ==
/// Errors reported by a [`GolfSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The API answered, but with an error (bad parameter, rate limit,
    /// missing credentials, ...)
    #[error("{message}")]
    Api {
        /// Machine-readable error code, e.g. `wrong_parameter`
        code: Option<String>,
        /// HTTP status, when the error came with one
        status: Option<u16>,
        message: String,
    },

    /// The API could not be reached or its response could not be read
    #[error("Upstream transport error: {0}")]
    Transport(String),
}

// == Plan Query ==
/// One upstream plan search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanQuery {
    /// Play date, `YYYY-MM-DD`
    pub play_date: String,
    pub area_code: Option<String>,
    pub golf_course_id: Option<u64>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub hits: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<String>,
}

// == Course Query ==
/// One upstream course search, by area, keyword or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseQuery {
    pub area_code: Option<String>,
    pub keyword: Option<String>,
    pub hits: Option<u32>,
    pub page: Option<u32>,
}

// == Golf Source ==
/// Anything that can answer plan and course searches with normalized data.
#[async_trait]
pub trait GolfSource: Send + Sync {
    async fn fetch_plans(&self, query: &PlanQuery) -> Result<Vec<Plan>, UpstreamError>;

    async fn fetch_courses(&self, query: &CourseQuery)
        -> Result<CourseSearchResults, UpstreamError>;
}
