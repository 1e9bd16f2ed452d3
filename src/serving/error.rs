//! HTTP error responses with structured JSON bodies.
//!
//! Every pipeline error is caught at the request boundary and converted
//! here; nothing propagates far enough to crash the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::errors::ClassifyError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// The error payload.
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable error code for clients.
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself is malformed (missing field, bad bytes).
    #[error("invalid request: {0}")]
    BadRequest(String),
    /// The pipeline failed on the server side.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "classification failed".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_maps_to_bad_request() {
        let err = ClassifyError::Decode(image::ImageError::IoError(std::io::Error::other(
            "bad bytes",
        )));
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::BadRequest(_)));
        assert_eq!(
            api.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_shape_mismatch_maps_to_internal() {
        let err = ClassifyError::ShapeMismatch {
            expected: 1000,
            actual: 10,
        };
        let api: ApiError = err.into();
        assert_eq!(
            api.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unsupported_color_mode_maps_to_bad_request() {
        let err = ClassifyError::UnsupportedColorMode {
            details: "Cmyk8".to_string(),
        };
        let api: ApiError = err.into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
