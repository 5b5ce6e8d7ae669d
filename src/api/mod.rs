//! API Module
//!
//! HTTP handlers and routing for the price service REST API.
//!
//! # Endpoints
//! - `GET /api/search` - One page of filtered, sorted plans
//! - `GET /api/courses` - Golf course search by area or keyword
//! - `GET /api/courses/:course_id/calendar` - Cheapest price per day for a course
//! - `GET /api/cache/stats` - Counters for both caches
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
