//! Login and logout endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use surgebox_core::SurgeError;
use tracing::{info, warn};

use crate::auth::{clear_session_cookie, client_ip, session_cookie, verify_password};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    #[serde(rename = "redirectTo")]
    pub redirect_to: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Exchange the shared password for a session cookie.
/// POST /api/login
///
/// Every request counts as an attempt, including ones whose body does not
/// parse.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let ip = client_ip(&headers);

    let decision = state.limiter.check(&ip).await?;
    if !decision.is_allowed() {
        warn!(ip = %ip, "login rate limited");
        return Err(SurgeError::rate_limit(
            "Too many attempts",
            Some(state.limiter.window().as_secs()),
        )
        .into());
    }

    let request: LoginRequest = serde_json::from_slice(&body)
        .map_err(|e| SurgeError::validation(format!("Invalid JSON body: {}", e)))?;

    if !verify_password(&state.config.app_password, &request.password) {
        info!(ip = %ip, "login rejected");
        return Err(SurgeError::authentication("Invalid password").into());
    }

    let value = state.sessions.issue(chrono::Utc::now().timestamp());
    let cookie = session_cookie(&value, state.sessions.ttl_secs(), state.config.secure_cookies);
    let body = LoginResponse {
        ok: true,
        redirect_to: format!("/{}/dashboard", state.config.url_token),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Clear the session cookie.
/// POST /:token/api/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = clear_session_cookie(state.config.secure_cookies);
    ([(header::SET_COOKIE, cookie)], Json(OkResponse { ok: true })).into_response()
}
