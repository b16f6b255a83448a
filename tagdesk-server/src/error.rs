//! Error types for tagdesk-server
//!
//! Maps core error kinds onto HTTP status codes with a uniform JSON body:
//! `{"error": {"code": ..., "message": ...}}`.

use axum::{
    extract::{
        multipart::MultipartError,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown dataset, session, item or input (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Duplicate dataset or session name (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unparseable or wrongly shaped request (400)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Storage engine failure (503)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<tagdesk_common::Error> for ApiError {
    fn from(err: tagdesk_common::Error) -> Self {
        use tagdesk_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::MalformedInput(msg) => ApiError::MalformedInput(msg),
            Error::Database(e) => ApiError::StorageUnavailable(e.to_string()),
            Error::Io(e) => ApiError::Internal(e.to_string()),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::MalformedInput(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::MalformedInput(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::MalformedInput(msg) => (StatusCode::BAD_REQUEST, "MALFORMED_INPUT", msg),
            ApiError::StorageUnavailable(msg) => {
                error!("Storage failure: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE", msg)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status_codes() {
        let cases = [
            (tagdesk_common::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (tagdesk_common::Error::Conflict("x".into()), StatusCode::CONFLICT),
            (tagdesk_common::Error::MalformedInput("x".into()), StatusCode::BAD_REQUEST),
            (
                tagdesk_common::Error::Database(sqlx::Error::PoolClosed),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (tagdesk_common::Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
