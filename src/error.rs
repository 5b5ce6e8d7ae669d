//! Error types for the price service
//!
//! Provides unified handler errors using thiserror. The caches themselves
//! never fail; everything here comes from request validation or the
//! upstream price API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::upstream::UpstreamError;

// == App Error Enum ==
/// Unified error type for the request handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream price API failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl AppError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(UpstreamError::Api { code, status, .. }) => {
                match code.as_deref() {
                    Some("wrong_parameter") | Some("invalid_app_id_format") => {
                        StatusCode::BAD_REQUEST
                    }
                    Some("not_found") => StatusCode::NOT_FOUND,
                    Some("too_many_requests") => StatusCode::TOO_MANY_REQUESTS,
                    _ => status
                        .and_then(|s| StatusCode::from_u16(s).ok())
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(StatusCode::BAD_GATEWAY),
                }
            }
            AppError::Upstream(UpstreamError::Transport(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::InvalidRequest(msg) => ErrorResponse::new(msg.clone()),
            AppError::Upstream(UpstreamError::Api { code, message, .. }) => {
                ErrorResponse::new(message.clone()).with_code(code.clone())
            }
            AppError::Upstream(UpstreamError::Transport(_)) => {
                ErrorResponse::new("failed to reach the price API")
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the handlers.
pub type Result<T> = std::result::Result<T, AppError>;
