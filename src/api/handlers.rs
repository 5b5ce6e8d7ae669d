//! API Handlers
//!
//! HTTP request handlers for each price service endpoint. Both data
//! endpoints follow the same pattern: derive the cache key, serve a hit
//! straight from the cache, otherwise fetch from the upstream and store the
//! result only once the fetch has succeeded. Course search is passed
//! through to the upstream uncached.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Days, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::cache::{CalendarCache, SearchCache, SearchParams};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::requests::parse_course_id;
use crate::models::{
    CacheStatsResponse, CalendarDay, CalendarPayload, CalendarQuery, CourseSearchQuery,
    CourseSearchResults, HealthResponse, Plan, SearchQuery, SearchResults,
};
use crate::upstream::{GolfSource, PlanQuery, UpstreamError, PLANS_PER_PAGE};

/// Application state shared across all handlers.
///
/// Each cache synchronizes internally, so the state only needs `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub search_cache: Arc<SearchCache>,
    pub calendar_cache: Arc<CalendarCache>,
    pub source: Arc<dyn GolfSource>,
    /// Pause between the per-day upstream calls of one calendar
    pub calendar_request_interval: Duration,
}

impl AppState {
    /// Creates a new AppState with default cache lifetimes and no pause
    /// between calendar calls.
    pub fn new(source: Arc<dyn GolfSource>) -> Self {
        Self {
            search_cache: Arc::new(SearchCache::default()),
            calendar_cache: Arc::new(CalendarCache::default()),
            source,
            calendar_request_interval: Duration::ZERO,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, source: Arc<dyn GolfSource>) -> Self {
        Self {
            search_cache: Arc::new(SearchCache::new(config.search_ttl())),
            calendar_cache: Arc::new(CalendarCache::new(config.calendar_ttl())),
            source,
            calendar_request_interval: config.calendar_request_interval(),
        }
    }
}

/// Handler for GET /api/search
///
/// Returns one page of plans for an area and play date, filtered and sorted.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>> {
    let (params, page) = query.validate()?;
    let key = SearchCache::key(&params, page);

    if let Some(cached) = state.search_cache.get(&key) {
        debug!(%key, "search cache hit");
        return Ok(Json(cached));
    }
    debug!(%key, "search cache miss");

    // Always the cheapest plans of the page; `sort` reorders within it.
    let upstream_query = PlanQuery {
        play_date: params.play_date.clone(),
        area_code: Some(params.area_code.clone()),
        min_price: params.min_price,
        max_price: params.max_price,
        hits: Some(PLANS_PER_PAGE),
        page: Some(page),
        sort: Some("price".to_string()),
        ..Default::default()
    };
    let plans = state.source.fetch_plans(&upstream_query).await.map_err(|e| {
        warn!(error = %e, play_date = %params.play_date, "search fetch failed");
        AppError::from(e)
    })?;

    let items = refine_plans(plans, &params);
    let results = SearchResults {
        play_date: params.play_date,
        area_code: params.area_code,
        page,
        total: items.len(),
        items,
    };

    state.search_cache.set(key, results.clone(), None);
    Ok(Json(results))
}

/// Applies the filters the upstream can't express, then the requested order.
///
/// Budget limits are re-checked here as well, since the upstream matches them
/// against a slightly different price than the normalized total. The order
/// only applies within the page: `price_desc` on page 1 lists that page's
/// plans, which are the cheapest ones, most expensive first.
pub fn refine_plans(plans: Vec<Plan>, params: &SearchParams) -> Vec<Plan> {
    let keyword = params
        .keyword
        .as_deref()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());

    let mut plans: Vec<Plan> = plans
        .into_iter()
        .filter(|p| params.max_price.map_or(true, |max| p.price_total <= max))
        .filter(|p| params.min_price.map_or(true, |min| p.price_total >= min))
        .filter(|p| params.lunch_only != Some(true) || p.lunch)
        .filter(|p| {
            params
                .start_time_zone
                .as_deref()
                .map_or(true, |zone| p.start_time_zone.as_deref() == Some(zone))
        })
        .filter(|p| {
            keyword.as_deref().map_or(true, |k| {
                p.course_name.to_lowercase().contains(k) || p.plan_name.to_lowercase().contains(k)
            })
        })
        .collect();

    params.sort.unwrap_or_default().apply(&mut plans);
    plans
}

/// Handler for GET /api/courses/:course_id/calendar
///
/// Returns the cheapest price per day for the next `days` days.
pub async fn calendar_handler(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarPayload>> {
    let course_id = parse_course_id(&course_id)?;
    let days = query.day_count();
    let key = CalendarCache::key(&course_id.to_string(), days);

    if let Some(cached) = state.calendar_cache.get(&key) {
        debug!(%key, "calendar cache hit");
        return Ok(Json(cached));
    }
    debug!(%key, "calendar cache miss");

    let calendar = build_calendar(
        state.source.as_ref(),
        course_id,
        &upcoming_dates(Utc::now().date_naive(), days),
        state.calendar_request_interval,
    )
    .await?;

    state.calendar_cache.set(key, calendar.clone(), None);
    Ok(Json(calendar))
}

/// `count` consecutive dates starting at `start`, formatted `YYYY-MM-DD`.
pub fn upcoming_dates(start: NaiveDate, count: u32) -> Vec<String> {
    (0..count)
        .filter_map(|offset| start.checked_add_days(Days::new(offset as u64)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect()
}

/// Queries the upstream once per date, in order, pausing `interval` between
/// calls.
///
/// A date the API rejects is recorded with no price and the calendar carries
/// on. A transport failure aborts the whole calendar.
pub async fn build_calendar(
    source: &dyn GolfSource,
    course_id: u64,
    dates: &[String],
    interval: Duration,
) -> Result<CalendarPayload> {
    let mut days = Vec::with_capacity(dates.len());
    let mut course_name: Option<String> = None;

    for (i, date) in dates.iter().enumerate() {
        if i > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }

        let query = PlanQuery {
            play_date: date.clone(),
            golf_course_id: Some(course_id),
            hits: Some(PLANS_PER_PAGE),
            sort: Some("price".to_string()),
            ..Default::default()
        };

        match source.fetch_plans(&query).await {
            Ok(plans) => {
                if course_name.is_none() {
                    course_name = plans
                        .first()
                        .map(|p| p.course_name.clone())
                        .filter(|name| !name.is_empty());
                }
                let cheapest = plans.iter().min_by_key(|p| p.price_total);
                days.push(CalendarDay {
                    date: date.clone(),
                    min_price: cheapest.map(|p| p.price_total),
                    reserve_url: cheapest.and_then(|p| p.reserve_url.clone()),
                });
            }
            Err(e @ UpstreamError::Api { .. }) => {
                warn!(course_id, %date, error = %e, "calendar day unavailable");
                days.push(CalendarDay {
                    date: date.clone(),
                    min_price: None,
                    reserve_url: None,
                });
            }
            Err(e) => {
                warn!(course_id, %date, error = %e, "calendar fetch aborted");
                return Err(e.into());
            }
        }
    }

    info!(course_id, days = days.len(), "calendar built");
    Ok(CalendarPayload {
        course_id,
        course_name,
        days,
    })
}

/// Handler for GET /api/courses
///
/// Searches golf courses by area and/or keyword.
pub async fn course_search_handler(
    State(state): State<AppState>,
    Query(query): Query<CourseSearchQuery>,
) -> Result<Json<CourseSearchResults>> {
    let upstream_query = query.validate()?;

    let results = state
        .source
        .fetch_courses(&upstream_query)
        .await
        .map_err(|e| {
            warn!(error = %e, "course search failed");
            AppError::from(e)
        })?;

    debug!(count = results.count, page = results.page, "course search served");
    Ok(Json(results))
}

/// Handler for GET /api/cache/stats
///
/// Returns counters for both caches.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        search: state.search_cache.stats().into(),
        calendar: state.calendar_cache.stats().into(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
