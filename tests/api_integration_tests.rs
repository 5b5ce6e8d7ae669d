//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles against a stubbed price API, and the
//! public cache surface the handlers are built on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use teetime_cache::{
    api::create_router,
    cache::{CalendarCache, SearchCache, SearchParams},
    models::{CalendarPayload, Course, CourseSearchResults, Plan, PriceSource, SearchResults},
    upstream::{CourseQuery, GolfSource, PlanQuery, UpstreamError},
    AppState,
};
use tower::ServiceExt;

// == Helper Functions ==

/// Stub golf API: counts calls and answers with one plan or one course per
/// query, or with the configured error.
struct StubSource {
    calls: AtomicUsize,
    error: Option<UpstreamError>,
}

impl StubSource {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            error: None,
        })
    }

    fn failing(error: UpstreamError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            error: Some(error),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GolfSource for StubSource {
    async fn fetch_plans(&self, query: &PlanQuery) -> Result<Vec<Plan>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let course_id = query.golf_course_id.unwrap_or(130001);
        Ok(vec![Plan {
            plan_id: format!("gora-{}-1", course_id),
            plan_name: "Weekday 18 holes".to_string(),
            price_total: 8800,
            course_id: course_id.to_string(),
            course_name: "Tokyo Hills".to_string(),
            prefecture: Some("Tokyo".to_string()),
            image_url: None,
            reserve_url: Some("https://example.com/reserve".to_string()),
            source: PriceSource::Gora,
            play_date: query.play_date.clone(),
            start_time_zone: Some("8".to_string()),
            lunch: true,
        }])
    }

    async fn fetch_courses(
        &self,
        query: &CourseQuery,
    ) -> Result<CourseSearchResults, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(CourseSearchResults {
            count: 1,
            page: query.page.unwrap_or(1),
            page_count: 1,
            items: vec![Course {
                course_id: 130001,
                course_name: "Tokyo Hills".to_string(),
                caption: None,
                address: Some("Hachioji, Tokyo".to_string()),
                latitude: Some(35.65),
                longitude: Some(139.32),
                highway: None,
                detail_url: None,
                reserve_url: Some("https://example.com/calendar".to_string()),
                image_url: None,
                evaluation: Some(4.1),
            }],
        })
    }
}

fn create_test_app(source: Arc<StubSource>) -> (Router, AppState) {
    let state = AppState::new(source);
    (create_router(state.clone()), state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Search Endpoint Tests ==

#[tokio::test]
async fn test_search_endpoint_success() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (status, json) = get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["playDate"], "2026-02-24");
    assert_eq!(json["areaCode"], "13");
    assert_eq!(json["page"], 1);
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["priceTotal"], 8800);
    assert_eq!(json["items"][0]["source"], "gora");
}

#[tokio::test]
async fn test_search_repeat_is_served_from_cache() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (_, first) = get(&app, "/api/search?playDate=2026-02-24&areaCode=13&keyword=tokyo").await;
    // Same search: padded keyword, explicit defaults, different parameter order
    let (status, second) = get(
        &app,
        "/api/search?sort=price&keyword=%20%20tokyo%20&lunchOnly=0&areaCode=13&playDate=2026-02-24&page=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_search_pages_are_cached_separately() {
    let source = StubSource::ok();
    let (app, state) = create_test_app(source.clone());

    get(&app, "/api/search?playDate=2026-02-24&areaCode=13&page=1").await;
    get(&app, "/api/search?playDate=2026-02-24&areaCode=13&page=2").await;

    assert_eq!(source.calls(), 2);
    assert_eq!(state.search_cache.len(), 2);
}

#[tokio::test]
async fn test_search_missing_play_date() {
    let (app, _) = create_test_app(StubSource::ok());

    let (status, json) = get(&app, "/api/search?areaCode=13").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_search_invalid_play_date() {
    let (app, _) = create_test_app(StubSource::ok());

    let (status, _) = get(&app, "/api/search?playDate=2026-13-01&areaCode=13").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_upstream_parameter_error() {
    let source = StubSource::failing(UpstreamError::Api {
        code: Some("wrong_parameter".to_string()),
        status: Some(400),
        message: "areaCode is invalid".to_string(),
    });
    let (app, state) = create_test_app(source.clone());

    let (status, json) = get(&app, "/api/search?playDate=2026-02-24&areaCode=999").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "wrong_parameter");
    assert!(state.search_cache.is_empty());
}

#[tokio::test]
async fn test_search_upstream_unreachable() {
    let source = StubSource::failing(UpstreamError::Transport("timed out".to_string()));
    let (app, state) = create_test_app(source.clone());

    let (status, _) = get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await;
    let (status_again, _) = get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(status_again, StatusCode::BAD_GATEWAY);
    // Failures are never cached, so the second request tried again
    assert_eq!(source.calls(), 2);
    assert!(state.search_cache.is_empty());
}

// == Calendar Endpoint Tests ==

#[tokio::test]
async fn test_calendar_endpoint_success() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (status, json) = get(&app, "/api/courses/130001/calendar?days=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["courseId"], 130001);
    assert_eq!(json["courseName"], "Tokyo Hills");
    let days = json["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["minPrice"], 8800);
    assert_eq!(days[0]["reserveUrl"], "https://example.com/reserve");
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_calendar_default_and_clamped_days() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (_, json) = get(&app, "/api/courses/130001/calendar").await;
    assert_eq!(json["days"].as_array().unwrap().len(), 7);

    let (_, json) = get(&app, "/api/courses/130002/calendar?days=0").await;
    assert_eq!(json["days"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_calendar_repeat_is_served_from_cache() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (_, first) = get(&app, "/api/courses/130001/calendar?days=2").await;
    let (_, second) = get(&app, "/api/courses/130001/calendar?days=2").await;
    get(&app, "/api/courses/130001/calendar?days=3").await;

    assert_eq!(first, second);
    assert_eq!(source.calls(), 2 + 3);
}

#[tokio::test]
async fn test_calendar_days_marked_unavailable_on_api_errors() {
    let source = StubSource::failing(UpstreamError::Api {
        code: Some("too_many_requests".to_string()),
        status: Some(429),
        message: "rate limited".to_string(),
    });
    let (app, state) = create_test_app(source.clone());

    let (status, json) = get(&app, "/api/courses/130001/calendar?days=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["courseName"], Value::Null);
    assert!(json["days"]
        .as_array()
        .unwrap()
        .iter()
        .all(|day| day["minPrice"].is_null()));
    // A degraded calendar is still the best known state for the window
    assert_eq!(state.calendar_cache.len(), 1);
}

#[tokio::test]
async fn test_calendar_invalid_course_id() {
    let (app, _) = create_test_app(StubSource::ok());

    let (status, json) = get(&app, "/api/courses/abc/calendar").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

// == Course Search Endpoint Tests ==

#[tokio::test]
async fn test_course_search_endpoint_success() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (status, json) = get(&app, "/api/courses?keyword=hills&page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["page"], 2);
    assert_eq!(json["items"][0]["courseId"], 130001);
    assert_eq!(json["items"][0]["reserveUrl"], "https://example.com/calendar");
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_course_search_requires_area_or_keyword() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    let (status, json) = get(&app, "/api/courses?page=1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_course_search_not_found() {
    let source = StubSource::failing(UpstreamError::Api {
        code: Some("not_found".to_string()),
        status: None,
        message: "no courses matched".to_string(),
    });
    let (app, _) = create_test_app(source);

    let (status, json) = get(&app, "/api/courses?areaCode=13").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
    assert_eq!(json["error"], "no courses matched");
}

#[tokio::test]
async fn test_course_search_rate_limited() {
    let source = StubSource::failing(UpstreamError::Api {
        code: Some("too_many_requests".to_string()),
        status: None,
        message: "rate limited".to_string(),
    });
    let (app, _) = create_test_app(source);

    let (status, json) = get(&app, "/api/courses?areaCode=13").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "too_many_requests");
}

#[tokio::test]
async fn test_course_search_upstream_unreachable() {
    let source = StubSource::failing(UpstreamError::Transport("timed out".to_string()));
    let (app, _) = create_test_app(source);

    let (status, _) = get(&app, "/api/courses?areaCode=13").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_course_search_does_not_touch_caches() {
    let (app, state) = create_test_app(StubSource::ok());

    get(&app, "/api/courses?areaCode=13").await;

    assert!(state.search_cache.is_empty());
    assert!(state.calendar_cache.is_empty());
}

// == Stats and Health Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _) = create_test_app(StubSource::ok());

    get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await; // miss
    get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await; // hit
    let (status, json) = get(&app, "/api/cache/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["search"]["hits"], 1);
    assert_eq!(json["search"]["misses"], 1);
    assert_eq!(json["search"]["total_entries"], 1);
    assert_eq!(json["calendar"]["total_entries"], 0);
    assert!(json["search"].get("hit_rate").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app(StubSource::ok());

    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Cache Surface Scenarios ==

#[test]
fn test_search_cache_round_trip_scenario() {
    let cache = SearchCache::default();
    let params = SearchParams {
        play_date: "2026-02-24".to_string(),
        area_code: "13".to_string(),
        ..Default::default()
    };
    let key = SearchCache::key(&params, 1);
    let results = SearchResults {
        total: 10,
        items: Vec::new(),
        ..Default::default()
    };

    cache.set(key.clone(), results, None);

    let cached = serde_json::to_value(cache.get(&key).unwrap()).unwrap();
    assert_eq!(cached["total"], json!(10));
    assert_eq!(cached["items"], json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_calendar_cache_expiry_scenario() {
    let cache = CalendarCache::default();
    let key = CalendarCache::key("1", 1);
    let calendar = CalendarPayload {
        course_id: 1,
        course_name: None,
        days: Vec::new(),
    };

    cache.set(key.clone(), calendar.clone(), Some(Duration::from_millis(5000)));
    assert_eq!(cache.get(&key), Some(calendar));

    tokio::time::advance(Duration::from_millis(5001)).await;
    assert_eq!(cache.get(&key), None);
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_expired_search_is_fetched_again() {
    let source = StubSource::ok();
    let (app, _) = create_test_app(source.clone());

    get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await;
    tokio::time::advance(Duration::from_secs(4 * 60)).await;
    get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await;
    assert_eq!(source.calls(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    get(&app, "/api/search?playDate=2026-02-24&areaCode=13").await;
    assert_eq!(source.calls(), 2);
}
