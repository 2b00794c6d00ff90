//! Error types and handling for the site API server.
//!
//! This module provides a unified error type [`AppError`] that wraps various error sources
//! and implements proper HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Fallback body message for failures no handler translated.
const GENERIC_FAILURE: &str = "Request failed.";

/// Main error type for the application.
///
/// All errors in the application should be converted to this type for consistent handling.
/// Client responses always carry the flat `{"error": "<message>"}` body the site
/// front-end expects; detailed variants are logged server-side and masked.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client provided missing or undersized input; no upstream call was made.
    #[error("{0}")]
    Validation(String),

    /// Uploaded file type not recognized, or nothing could be extracted from it.
    #[error("{0}")]
    UnsupportedInput(String),

    /// Per-client quota exhausted for the current window.
    #[error("{0}")]
    QuotaExceeded(String),

    /// The upstream model call failed (transport, status, or unusable body).
    /// The payload is server-side detail and is never sent to clients.
    #[error("upstream model call failed: {0}")]
    Upstream(String),

    /// Model reply carried no parseable JSON object.
    #[error("no JSON object in model reply: {0}")]
    Parse(String),

    /// JSON serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors from the reqwest client
    #[error("http request error: {0}")]
    Request(#[from] reqwest::Error),

    /// A handler-level failure with a client-safe message, e.g. "Classification failed."
    #[error("{0}")]
    OperationFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) | AppError::UnsupportedInput(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::QuotaExceeded(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::OperationFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            // Detailed variants reach here only when a handler did not translate
            // them; log the detail and answer with the generic message.
            err @ (AppError::Upstream(_)
            | AppError::Parse(_)
            | AppError::Serialization(_)
            | AppError::Request(_)) => {
                tracing::error!(error = %err, "unhandled failure reached response mapping");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    // -- display ----

    #[test]
    fn test_error_display() {
        let err = AppError::Validation("Description too short.".to_string());
        assert_eq!(err.to_string(), "Description too short.");

        let err = AppError::Upstream("status 529".to_string());
        assert_eq!(err.to_string(), "upstream model call failed: status 529");

        let err = AppError::Parse("no braces".to_string());
        assert_eq!(err.to_string(), "no JSON object in model reply: no braces");
    }

    // -- status mapping ----

    #[test]
    fn test_validation_response() {
        let err = AppError::Validation("Document too short.".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_input_response() {
        let err = AppError::UnsupportedInput("Unsupported file type.".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_quota_exceeded_response() {
        let err = AppError::QuotaExceeded("Rate limit exceeded.".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_operation_failed_response() {
        let err = AppError::OperationFailed("Classification failed.".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_detail_is_masked() {
        let err = AppError::Upstream("secret provider detail".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // -- body shape ----

    #[tokio::test]
    async fn test_flat_error_body() {
        let err = AppError::QuotaExceeded("Rate limit exceeded.".to_string());
        let response = err.into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Rate limit exceeded." }));
    }

    #[tokio::test]
    async fn test_upstream_body_never_carries_detail() {
        let err = AppError::Upstream("api.internal.host refused".to_string());
        let response = err.into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], GENERIC_FAILURE);
    }

    // -- conversions ----

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<String> {
            Ok("success".to_string())
        }

        assert_eq!(returns_result().unwrap(), "success");
    }
}
