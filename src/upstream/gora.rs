//! Rakuten GORA client
//!
//! Fetches plans from the GORA plan search API and courses from the GORA
//! course search API, and converts them into [`Plan`]s and [`Course`]s. Both
//! plan response shapes GORA produces are accepted: courses with nested
//! `plans`, and flat items where each item is itself a plan.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CourseQuery, GolfSource, PlanQuery, UpstreamError};
use crate::models::{Course, CourseSearchResults, Plan, PriceSource};

/// Default GORA plan search endpoint
pub const GORA_PLAN_SEARCH_URL: &str =
    "https://app.rakuten.co.jp/services/api/Gora/GoraPlanSearch/20170623";

/// Default GORA course search endpoint
pub const GORA_COURSE_SEARCH_URL: &str =
    "https://app.rakuten.co.jp/services/api/Gora/GoraGolfCourseSearch/20170623";

// == Wire Types ==

/// Search response body (`formatVersion=2`), shared by both endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoraSearchResponse<I> {
    #[serde(alias = "Items")]
    items: Option<Vec<I>>,
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    page_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "error_description")]
    error_description: Option<String>,
}

/// Error body sent with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct GoraErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// One course entry, or one flat plan entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoraItem {
    #[serde(default)]
    pub golf_course_id: Option<u64>,
    #[serde(default)]
    pub golf_course_name: Option<String>,
    #[serde(default)]
    pub prefecture: Option<String>,
    #[serde(default)]
    pub golf_course_image_url: Option<String>,
    #[serde(default, rename = "reserveCalUrlPC")]
    pub reserve_cal_url_pc: Option<String>,
    #[serde(default)]
    pub reserve_cal_url_mobile: Option<String>,
    #[serde(default)]
    pub plans: Option<Vec<GoraPlanDetail>>,
    // Flat shape
    #[serde(default)]
    pub plan_id: Option<u64>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub start_time_zone: Option<String>,
    #[serde(default)]
    pub lunch: Option<u8>,
}

/// A plan nested under a course entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoraPlanDetail {
    pub plan_id: u64,
    #[serde(default)]
    pub plan_name: Option<String>,
    /// Total price including taxes
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub start_time_zone: Option<String>,
    #[serde(default)]
    pub lunch: Option<u8>,
}

/// One entry of the course search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoraCourseItem {
    #[serde(default)]
    pub golf_course_id: Option<u64>,
    #[serde(default)]
    pub golf_course_name: Option<String>,
    #[serde(default)]
    pub golf_course_caption: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub highway: Option<String>,
    #[serde(default)]
    pub golf_course_detail_url: Option<String>,
    #[serde(default)]
    pub reserve_cal_url: Option<String>,
    #[serde(default)]
    pub golf_course_image_url: Option<String>,
    #[serde(default)]
    pub evaluation: Option<f64>,
}

// == Normalization ==

/// Converts GORA items into normalized plans for `play_date`.
///
/// Items without a course id are skipped. Courses without nested plans are
/// taken as flat plans when they carry a plan id and a price, and skipped
/// otherwise.
pub fn normalize_gora_items(items: &[GoraItem], play_date: &str) -> Vec<Plan> {
    let mut plans = Vec::new();

    for course in items {
        let Some(course_id) = course.golf_course_id else {
            continue;
        };
        let reserve_url = course
            .reserve_cal_url_pc
            .clone()
            .or_else(|| course.reserve_cal_url_mobile.clone());
        let base = |plan_id: u64,
                    plan_name: Option<&String>,
                    price: u32,
                    start_time_zone: Option<&String>,
                    lunch: Option<u8>| Plan {
            plan_id: format!("gora-{}-{}", course_id, plan_id),
            plan_name: plan_name.cloned().unwrap_or_default(),
            price_total: price,
            course_id: course_id.to_string(),
            course_name: course.golf_course_name.clone().unwrap_or_default(),
            prefecture: course.prefecture.clone(),
            image_url: course.golf_course_image_url.clone(),
            reserve_url: reserve_url.clone(),
            source: PriceSource::Gora,
            play_date: play_date.to_string(),
            start_time_zone: start_time_zone.cloned(),
            lunch: lunch == Some(1),
        };

        match course.plans.as_deref() {
            Some(nested) if !nested.is_empty() => {
                for p in nested {
                    plans.push(base(
                        p.plan_id,
                        p.plan_name.as_ref(),
                        p.price.unwrap_or(0),
                        p.start_time_zone.as_ref(),
                        p.lunch,
                    ));
                }
            }
            _ => {
                if let (Some(plan_id), Some(price)) = (course.plan_id, course.price) {
                    plans.push(base(
                        plan_id,
                        course.plan_name.as_ref(),
                        price,
                        course.start_time_zone.as_ref(),
                        course.lunch,
                    ));
                }
            }
        }
    }

    plans
}

/// Converts GORA course entries into [`Course`]s, skipping entries without
/// a course id.
pub fn normalize_gora_courses(items: &[GoraCourseItem]) -> Vec<Course> {
    items
        .iter()
        .filter_map(|item| {
            Some(Course {
                course_id: item.golf_course_id?,
                course_name: item.golf_course_name.clone().unwrap_or_default(),
                caption: item.golf_course_caption.clone(),
                address: item.address.clone(),
                latitude: item.latitude,
                longitude: item.longitude,
                highway: item.highway.clone(),
                detail_url: item.golf_course_detail_url.clone(),
                reserve_url: item.reserve_cal_url.clone(),
                image_url: item.golf_course_image_url.clone(),
                evaluation: item.evaluation,
            })
        })
        .collect()
}

// == Client ==

/// HTTP client for the GORA search APIs.
#[derive(Debug, Clone)]
pub struct GoraClient {
    client: Client,
    app_id: String,
    plan_search_url: String,
    course_search_url: String,
}

impl GoraClient {
    /// Creates a client for the public endpoints with the given application id.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            app_id: app_id.into(),
            plan_search_url: GORA_PLAN_SEARCH_URL.to_string(),
            course_search_url: GORA_COURSE_SEARCH_URL.to_string(),
        }
    }

    /// Points plan searches at another endpoint (a proxy or a local fake).
    pub fn with_plan_search_url(mut self, url: impl Into<String>) -> Self {
        self.plan_search_url = url.into();
        self
    }

    /// Points course searches at another endpoint.
    pub fn with_course_search_url(mut self, url: impl Into<String>) -> Self {
        self.course_search_url = url.into();
        self
    }

    fn base_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("applicationId", self.app_id.clone()),
            ("format", "json".to_string()),
            ("formatVersion", "2".to_string()),
        ]
    }

    fn plan_pairs(&self, query: &PlanQuery) -> Vec<(&'static str, String)> {
        let mut pairs = self.base_pairs();
        pairs.push(("playDate", query.play_date.clone()));
        if let Some(area_code) = query.area_code.as_ref().filter(|a| !a.is_empty()) {
            pairs.push(("areaCode", area_code.clone()));
        }
        if let Some(id) = query.golf_course_id {
            pairs.push(("golfCourseId", id.to_string()));
        }
        if let Some(min) = query.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = query.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        push_paging(&mut pairs, query.hits, query.page);
        if let Some(sort) = query.sort.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("sort", sort.clone()));
        }
        pairs
    }

    fn course_pairs(&self, query: &CourseQuery) -> Vec<(&'static str, String)> {
        let mut pairs = self.base_pairs();
        if let Some(area_code) = query.area_code.as_ref().filter(|a| !a.is_empty()) {
            pairs.push(("areaCode", area_code.clone()));
        }
        if let Some(keyword) = query.keyword.as_ref().filter(|k| !k.is_empty()) {
            pairs.push(("keyword", keyword.clone()));
        }
        push_paging(&mut pairs, query.hits, query.page);
        pairs
    }

    /// Runs one search against `url` and decodes the body.
    ///
    /// Non-2xx responses and 2xx bodies carrying an `error` field are API
    /// errors; anything that stops a body from arriving or decoding is a
    /// transport error.
    async fn search<I: DeserializeOwned>(
        &self,
        url: &str,
        pairs: &[(&'static str, String)],
    ) -> Result<GoraSearchResponse<I>, UpstreamError> {
        let response = self
            .client
            .get(url)
            .query(pairs)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body: GoraErrorBody = response.json().await.unwrap_or_default();
            warn!(status = status.as_u16(), code = ?body.error, %url, "GORA search failed");
            return Err(UpstreamError::Api {
                message: body
                    .error_description
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                code: body.error,
                status: Some(status.as_u16()),
            });
        }

        let mut body: GoraSearchResponse<I> = response.json().await.map_err(transport)?;
        if let Some(code) = body.error.take() {
            warn!(code = %code, %url, "GORA search returned an error body");
            return Err(UpstreamError::Api {
                message: body.error_description.take().unwrap_or_else(|| code.clone()),
                code: Some(code),
                status: None,
            });
        }
        Ok(body)
    }
}

fn push_paging(pairs: &mut Vec<(&'static str, String)>, hits: Option<u32>, page: Option<u32>) {
    if let Some(hits) = hits.filter(|h| *h > 0) {
        pairs.push(("hits", hits.to_string()));
    }
    if let Some(page) = page.filter(|p| *p > 0) {
        pairs.push(("page", page.to_string()));
    }
}

fn transport(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport(err.to_string())
}

#[async_trait]
impl GolfSource for GoraClient {
    async fn fetch_plans(&self, query: &PlanQuery) -> Result<Vec<Plan>, UpstreamError> {
        let body: GoraSearchResponse<GoraItem> = self
            .search(&self.plan_search_url, &self.plan_pairs(query))
            .await?;

        let items = body.items.unwrap_or_default();
        let plans = normalize_gora_items(&items, &query.play_date);
        debug!(
            play_date = %query.play_date,
            items = items.len(),
            plans = plans.len(),
            "GORA plan search succeeded"
        );
        Ok(plans)
    }

    async fn fetch_courses(
        &self,
        query: &CourseQuery,
    ) -> Result<CourseSearchResults, UpstreamError> {
        let body: GoraSearchResponse<GoraCourseItem> = self
            .search(&self.course_search_url, &self.course_pairs(query))
            .await?;

        let items = normalize_gora_courses(&body.items.unwrap_or_default());
        let page = body.page.or(query.page).unwrap_or(1);
        debug!(courses = items.len(), page, "GORA course search succeeded");
        Ok(CourseSearchResults {
            count: body.count.unwrap_or(items.len() as u32),
            page,
            page_count: body.page_count.unwrap_or(page),
            items,
        })
    }
}
