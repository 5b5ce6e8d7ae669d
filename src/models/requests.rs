//! Request DTOs for the price API
//!
//! Raw query strings as they arrive, and their validation into the typed
//! parameters the caches and the upstream client work with.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::cache::SearchParams;
use crate::error::{AppError, Result};
use crate::models::SortOrder;
use crate::upstream::CourseQuery;

/// Calendar length used when `days` is missing or unparsable.
pub const DEFAULT_CALENDAR_DAYS: u32 = 7;
/// Longest calendar a single request may ask for.
pub const MAX_CALENDAR_DAYS: u32 = 30;
/// Course search page size, used by default and as the upper limit.
pub const COURSES_PER_PAGE: u32 = 30;

// == Search Query ==
/// Query string of `GET /api/search`.
///
/// Every field is kept as text so malformed values produce our own error
/// message instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub play_date: Option<String>,
    pub area_code: Option<String>,
    pub keyword: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub lunch_only: Option<String>,
    pub sort: Option<String>,
    pub start_time_zone: Option<String>,
    pub page: Option<String>,
}

impl SearchQuery {
    /// Validates the query and returns the typed parameters and page.
    pub fn validate(&self) -> Result<(SearchParams, u32)> {
        let play_date = non_empty(&self.play_date)
            .ok_or_else(|| invalid("playDate (YYYY-MM-DD) is required"))?;
        if !is_valid_play_date(play_date) {
            return Err(invalid("playDate must be a valid date in YYYY-MM-DD format"));
        }

        let area_code =
            non_empty(&self.area_code).ok_or_else(|| invalid("areaCode is required"))?;

        let min_price = parse_price(&self.min_price, "minPrice")?;
        let max_price = parse_price(&self.max_price, "maxPrice")?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(invalid("minPrice must not exceed maxPrice"));
            }
        }

        let lunch_only = match non_empty(&self.lunch_only) {
            None => None,
            Some("1") | Some("true") => Some(true),
            Some("0") | Some("false") => Some(false),
            Some(_) => return Err(invalid("lunchOnly must be 1, 0, true or false")),
        };

        let sort = match non_empty(&self.sort) {
            None => None,
            Some(s) => Some(
                SortOrder::parse(s)
                    .ok_or_else(|| invalid("sort must be one of price, price_desc, name"))?,
            ),
        };

        let page = parse_page(&self.page)?;

        let params = SearchParams {
            play_date: play_date.to_string(),
            area_code: area_code.to_string(),
            keyword: self.keyword.clone(),
            min_price,
            max_price,
            lunch_only,
            sort,
            start_time_zone: non_empty(&self.start_time_zone).map(str::to_string),
        };

        Ok((params, page))
    }
}

// == Calendar Query ==
/// Query string of `GET /api/courses/:course_id/calendar`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub days: Option<String>,
}

impl CalendarQuery {
    /// Requested calendar length, defaulting to 7 and clamped to 1..=30.
    pub fn day_count(&self) -> u32 {
        self.days
            .as_deref()
            .and_then(|d| d.trim().parse::<i64>().ok())
            .map(|d| d.clamp(1, MAX_CALENDAR_DAYS as i64) as u32)
            .unwrap_or(DEFAULT_CALENDAR_DAYS)
    }
}

// == Course Search Query ==
/// Query string of `GET /api/courses`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSearchQuery {
    pub area_code: Option<String>,
    pub keyword: Option<String>,
    pub hits: Option<String>,
    pub page: Option<String>,
}

impl CourseSearchQuery {
    /// Validates the query into an upstream course search.
    ///
    /// At least one of `areaCode` and `keyword` is required.
    pub fn validate(&self) -> Result<CourseQuery> {
        let area_code = non_empty(&self.area_code).map(str::to_string);
        let keyword = non_empty(&self.keyword).map(str::to_string);
        if area_code.is_none() && keyword.is_none() {
            return Err(invalid("either areaCode or keyword is required"));
        }

        let hits = match non_empty(&self.hits) {
            None => COURSES_PER_PAGE,
            Some(h) => match h.parse::<u32>() {
                Ok(hits) if (1..=COURSES_PER_PAGE).contains(&hits) => hits,
                _ => {
                    return Err(invalid(format!(
                        "hits must be between 1 and {}",
                        COURSES_PER_PAGE
                    )))
                }
            },
        };

        Ok(CourseQuery {
            area_code,
            keyword,
            hits: Some(hits),
            page: Some(parse_page(&self.page)?),
        })
    }
}

/// Parses a course id path segment, which must be an integer.
pub fn parse_course_id(raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| invalid(format!("invalid course id: {}", raw)))
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidRequest(message.into())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(value: &Option<String>, name: &str) -> Result<Option<u32>> {
    non_empty(value)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| invalid(format!("{} must be a non-negative integer", name)))
        })
        .transpose()
}

fn parse_page(value: &Option<String>) -> Result<u32> {
    match non_empty(value) {
        None => Ok(1),
        Some(p) => match p.parse::<u32>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(invalid("page must be a positive integer")),
        },
    }
}

/// Accepts exactly `YYYY-MM-DD` naming a real calendar day.
fn is_valid_play_date(s: &str) -> bool {
    s.len() == 10
        && s.as_bytes()[4] == b'-'
        && s.as_bytes()[7] == b'-'
        && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
