//! Teetime Cache - golf tee-time price comparison service
//!
//! Serves plan search and per-course price calendars from the Rakuten GORA
//! API, fronted by two process-local TTL caches.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_sweep_task;
