//! Middleware for the REST API server.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};
use surgebox_core::SurgeError;
use tracing::{debug, info};

use crate::auth::{cookie_value, path_token_matches, token_from_path, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Create CORS middleware.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Request logging middleware.
///
/// Logs the path only. The query string can carry version hashes but the
/// first path segment is the access token, so it is masked.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = mask_token(request.uri().path());
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

fn mask_token(path: &str) -> String {
    let token = token_from_path(path);
    if token.is_empty() || token == "api" || token == "health" {
        return path.to_string();
    }
    path.replacen(token, "***", 1)
}

/// Require a valid session cookie and a matching path token.
///
/// Missing or invalid sessions are rejected with 401 before the token is
/// looked at; a token mismatch is 403.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let now = chrono::Utc::now().timestamp();
    let valid = cookie_value(request.headers(), SESSION_COOKIE)
        .map(|value| state.sessions.verify(value, now))
        .unwrap_or(false);
    if !valid {
        debug!("rejected request without a valid session");
        return ApiError::from(SurgeError::session_required()).into_response();
    }

    if !path_token_matches(&state.config.url_token, token_from_path(request.uri().path())) {
        return ApiError::from(SurgeError::invalid_path_token()).into_response();
    }

    next.run(request).await
}

/// Require a matching path token only.
pub async fn require_path_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !path_token_matches(&state.config.url_token, token_from_path(request.uri().path())) {
        return ApiError::from(SurgeError::invalid_path_token()).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("/s3cret/api/file"), "/***/api/file");
        assert_eq!(mask_token("/api/login"), "/api/login");
        assert_eq!(mask_token("/health"), "/health");
    }
}
