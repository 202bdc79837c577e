//! Error handling for the REST API server.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use surgebox_core::error::{ErrorCode, SurgeError};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
            retry_after: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = %self.code, "{}", self.message);
        }

        let retry_after = self.retry_after;
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<SurgeError> for ApiError {
    fn from(err: SurgeError) -> Self {
        let code = err.code().as_str();
        let suggestion = err.suggestion().map(str::to_string);

        let api = match err {
            SurgeError::BackendUnavailable { message, .. } => {
                ApiError::service_unavailable(message)
            }
            SurgeError::VersionNotFound { hash, .. } => {
                ApiError::not_found(format!("Version not found: {}", hash))
            }
            SurgeError::CannotDeleteCurrentVersion { .. } => {
                ApiError::bad_request("Cannot delete the current version")
            }
            SurgeError::Authentication {
                message,
                code: ErrorCode::AuthInvalidToken,
            } => ApiError::forbidden(message),
            SurgeError::Authentication { message, .. } => ApiError::unauthorized(message),
            SurgeError::Validation {
                message,
                code: ErrorCode::ValPayloadTooLarge,
                ..
            } => ApiError::payload_too_large(message),
            SurgeError::Validation { message, .. } => ApiError::bad_request(message),
            SurgeError::RateLimit {
                message,
                retry_after,
                ..
            } => {
                let mut api = ApiError::rate_limit(message);
                api.retry_after = retry_after;
                api
            }
            SurgeError::Configuration(msg) => ApiError::internal(msg),
            SurgeError::Io(e) => ApiError::internal(format!("IO error: {}", e)),
        }
        .with_code(code);

        match suggestion {
            Some(s) => api.with_details(serde_json::json!({ "suggestion": s })),
            None => api,
        }
    }
}

impl ApiError {
    fn with_code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SurgeError::backend_not_configured(), StatusCode::SERVICE_UNAVAILABLE),
            (SurgeError::backend("GET failed"), StatusCode::SERVICE_UNAVAILABLE),
            (SurgeError::version_not_found("abc"), StatusCode::NOT_FOUND),
            (SurgeError::cannot_delete_current("abc"), StatusCode::BAD_REQUEST),
            (SurgeError::validation("bad"), StatusCode::BAD_REQUEST),
            (SurgeError::missing_field("sha"), StatusCode::BAD_REQUEST),
            (SurgeError::payload_too_large(1024), StatusCode::PAYLOAD_TOO_LARGE),
            (SurgeError::authentication("no"), StatusCode::UNAUTHORIZED),
            (SurgeError::session_required(), StatusCode::UNAUTHORIZED),
            (SurgeError::invalid_path_token(), StatusCode::FORBIDDEN),
            (SurgeError::rate_limit("slow down", Some(600)), StatusCode::TOO_MANY_REQUESTS),
            (SurgeError::Configuration("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_core_code_is_kept() {
        let api = ApiError::from(SurgeError::backend_not_configured());
        assert_eq!(api.code, "KV_001");

        let api = ApiError::from(SurgeError::cannot_delete_current("abc"));
        assert_eq!(api.code, "VER_002");
        assert_eq!(api.message, "Cannot delete the current version");
    }

    #[test]
    fn test_retry_after_header() {
        let response = ApiError::from(SurgeError::rate_limit("slow down", Some(600))).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "600");
    }
}
