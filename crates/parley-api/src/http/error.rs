//! Application error type mapping to HTTP status codes.
//!
//! The wire format is a flat object with an `error` key. Only payload
//! validation has a dedicated status; everything else is a 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Fixed message for every rejected request body.
pub const INVALID_PAYLOAD: &str = "Invalid request payload";

/// Fixed message for server-side failures.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Body missing, malformed, or not matching `{"sentence": string}`.
    InvalidPayload,
    /// Model, transcript or task failure.
    Internal {
        message: String,
        /// Include `message` in the response body (debug mode).
        expose: bool,
    },
}

impl AppError {
    pub fn internal(err: impl std::fmt::Display, expose: bool) -> Self {
        AppError::Internal {
            message: err.to_string(),
            expose,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidPayload => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": INVALID_PAYLOAD })),
            )
                .into_response(),
            AppError::Internal { message, expose } => {
                tracing::error!(error = %message, "Request failed");
                let body = if expose {
                    json!({ "error": INTERNAL_ERROR, "detail": message })
                } else {
                    json!({ "error": INTERNAL_ERROR })
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::error::{ChatError, GenerationError};

    #[test]
    fn test_invalid_payload_is_bad_request() {
        let response = AppError::InvalidPayload.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_status() {
        let err = AppError::internal(ChatError::from(GenerationError::EmptyInput), false);
        assert!(matches!(err, AppError::Internal { expose: false, .. }));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
