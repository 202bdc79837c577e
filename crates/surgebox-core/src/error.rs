//! Error types for surgebox operations.
//!
//! This module provides the error hierarchy with structured error codes
//! and suggestions for resolution.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for surgebox operations.
pub type SurgeResult<T> = Result<T, SurgeError>;

/// Main error type for all surgebox operations.
#[derive(Error, Debug)]
pub enum SurgeError {
    /// Remote key-value backend is not configured or not reachable.
    #[error("Backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Rollback target has no stored content.
    #[error("Version not found: {hash}")]
    VersionNotFound { hash: String, code: ErrorCode },

    /// Attempted to delete the version backing the live document.
    #[error("Cannot delete the current version: {hash}")]
    CannotDeleteCurrentVersion { hash: String, code: ErrorCode },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication { message: String, code: ErrorCode },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        code: ErrorCode,
        retry_after: Option<u64>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Backend (KV_xxx)
    KvNotConfigured,
    KvConnectionFailed,
    KvOperationFailed,
    KvInvalidResponse,

    // Versions (VER_xxx)
    VerNotFound,
    VerDeleteCurrent,

    // Authentication (AUTH_xxx)
    AuthInvalidPassword,
    AuthMissingSession,
    AuthInvalidToken,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValPayloadTooLarge,

    // Rate Limit (RATE_xxx)
    RateLimitExceeded,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::KvNotConfigured => "KV_001",
            ErrorCode::KvConnectionFailed => "KV_002",
            ErrorCode::KvOperationFailed => "KV_003",
            ErrorCode::KvInvalidResponse => "KV_004",
            ErrorCode::VerNotFound => "VER_001",
            ErrorCode::VerDeleteCurrent => "VER_002",
            ErrorCode::AuthInvalidPassword => "AUTH_001",
            ErrorCode::AuthMissingSession => "AUTH_002",
            ErrorCode::AuthInvalidToken => "AUTH_003",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValPayloadTooLarge => "VAL_003",
            ErrorCode::RateLimitExceeded => "RATE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl SurgeError {
    /// Backend was never configured (missing URL or token).
    pub fn backend_not_configured() -> Self {
        Self::BackendUnavailable {
            message: "key-value backend is not configured".to_string(),
            code: ErrorCode::KvNotConfigured,
            source: None,
        }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            code: ErrorCode::KvOperationFailed,
            source: None,
        }
    }

    /// Create a backend error wrapping an underlying cause.
    pub fn backend_with_source(
        message: impl Into<String>,
        code: ErrorCode,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            code,
            source: Some(Box::new(source)),
        }
    }

    /// Create a version not found error.
    pub fn version_not_found(hash: impl Into<String>) -> Self {
        Self::VersionNotFound {
            hash: hash.into(),
            code: ErrorCode::VerNotFound,
        }
    }

    /// Create a delete-current error.
    pub fn cannot_delete_current(hash: impl Into<String>) -> Self {
        Self::CannotDeleteCurrentVersion {
            hash: hash.into(),
            code: ErrorCode::VerDeleteCurrent,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// A required request field is absent.
    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Validation {
            message: format!("Missing `{}`", field),
            code: ErrorCode::ValMissingField,
            details: HashMap::from([("field".to_string(), field)]),
            suggestion: None,
        }
    }

    /// Request payload exceeds `limit` bytes.
    pub fn payload_too_large(limit: usize) -> Self {
        Self::Validation {
            message: "File too large".to_string(),
            code: ErrorCode::ValPayloadTooLarge,
            details: HashMap::from([("limit_bytes".to_string(), limit.to_string())]),
            suggestion: None,
        }
    }

    /// Create an authentication error for a rejected password.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: ErrorCode::AuthInvalidPassword,
        }
    }

    /// Request carried no valid session.
    pub fn session_required() -> Self {
        Self::Authentication {
            message: "Unauthorized".to_string(),
            code: ErrorCode::AuthMissingSession,
        }
    }

    /// Path token does not match the configured one.
    pub fn invalid_path_token() -> Self {
        Self::Authentication {
            message: "Forbidden".to_string(),
            code: ErrorCode::AuthInvalidToken,
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            code: ErrorCode::RateLimitExceeded,
            retry_after,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BackendUnavailable { code, .. } => *code,
            Self::VersionNotFound { code, .. } => *code,
            Self::CannotDeleteCurrentVersion { code, .. } => *code,
            Self::Authentication { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::RateLimit { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::BackendUnavailable {
                code: ErrorCode::KvNotConfigured,
                ..
            } => Some("Set UPSTASH_REDIS_REST_URL and UPSTASH_REDIS_REST_TOKEN"),
            Self::BackendUnavailable { .. } => Some("Check connectivity to the key-value backend"),
            Self::VersionNotFound { .. } => Some("The version may have been evicted from history"),
            Self::CannotDeleteCurrentVersion { .. } => {
                Some("Roll back to another version before deleting this one")
            }
            Self::RateLimit { .. } => Some("Please wait before making more requests"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Whether the error originates from the backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}

impl From<serde_json::Error> for SurgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::BackendUnavailable {
            message: format!("malformed backend payload: {}", err),
            code: ErrorCode::KvInvalidResponse,
            source: Some(Box::new(err)),
        }
    }
}
