use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with their HTTP mappings.
///
/// Expected rejection outcomes (bad signatures, rate limits, invalid
/// payloads) are values, not panics: utilities return structured results
/// and handlers convert them into these variants. Only configuration
/// mistakes abort, and they do so at startup.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing, malformed, expired, or mismatched request authentication.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller exhausted its request budget. Not a failure, an expected
    /// control-flow outcome surfaced as HTTP 429.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for API endpoints.
///
/// `success` is always `false`; clients branch on it without inspecting
/// status codes.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail goes to the server log; clients get sanitized
        // messages where the detail could leak internals.
        tracing::error!(error = %self, "Request failed");

        match self {
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, axum::Json(ErrorResponse::new(message))).into_response()
            }

            AppError::RateLimited {
                message,
                retry_after_secs,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after_secs.to_string())],
                axum::Json(ErrorResponse::new(message)),
            )
                .into_response(),

            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, axum::Json(ErrorResponse::new(message))).into_response()
            }

            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, axum::Json(ErrorResponse::new(message))).into_response()
            }

            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, axum::Json(ErrorResponse::new(message))).into_response()
            }

            AppError::Serialization(e) => (
                StatusCode::BAD_REQUEST,
                axum::Json(ErrorResponse::new(sanitize_serde_error(&e))),
            )
                .into_response(),

            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(ErrorResponse::new(
                    "Service configuration error. Please contact support.",
                )),
            )
                .into_response(),

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(ErrorResponse::new(
                    "An internal error occurred. Please try again later.",
                )),
            )
                .into_response(),
        }
    }
}

/// Sanitize serde error messages to avoid leaking internal type names.
///
/// Field-level problems are useful to clients debugging their payloads;
/// everything else collapses to a generic message.
fn sanitize_serde_error(e: &serde_json::Error) -> String {
    let msg = e.to_string();

    if msg.contains("missing field")
        && let Some(start) = msg.find('`')
        && let Some(end) = msg[start + 1..].find('`')
    {
        let field = &msg[start + 1..start + 1 + end];
        return format!("Missing required field: {field}");
    }

    if msg.contains("unknown field")
        && let Some(start) = msg.find('`')
        && let Some(end) = msg[start + 1..].find('`')
    {
        let field = &msg[start + 1..start + 1 + end];
        return format!("Unknown field: {field}");
    }

    if msg.contains("invalid type") {
        return "Invalid data type in request body".to_string();
    }

    if msg.contains("EOF while parsing") || msg.contains("expected") {
        return "Malformed JSON in request body".to_string();
    }

    "Invalid request format".to_string()
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_401() {
        let response = AppError::Unauthorized("Invalid signature".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rate_limited_maps_to_429_with_retry_after() {
        let response = AppError::RateLimited {
            message: "slow down".to_string(),
            retry_after_secs: 86400,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("Retry-After").unwrap().to_str().unwrap(),
            "86400"
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = AppError::Conflict("slug exists".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_sanitize_missing_field() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        // Malformed JSON collapses to the generic message.
        assert!(sanitize_serde_error(&err).contains("JSON") || sanitize_serde_error(&err).contains("format"));
    }
}
