//! Route definitions for the REST API.

mod file;
mod health;
mod login;
mod raw;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware::{require_path_token, require_session};
use crate::state::AppState;

/// Room left for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    // Session and path token
    let document = Router::new()
        .route(
            "/:token/api/file",
            get(file::get_file)
                .put(file::put_file)
                .post(file::upload_file)
                .delete(file::delete_file_version),
        )
        .route_layer(from_fn_with_state(state.clone(), require_session));

    // Path token only, so the file can be fetched as a managed config URL
    let raw = Router::new()
        .route("/:token/api/raw", get(raw::get_raw))
        .route_layer(from_fn_with_state(state.clone(), require_path_token));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Session
        .route("/api/login", post(login::login))
        .route("/:token/api/logout", post(login::logout))
        .merge(document)
        .merge(raw)
        .layer(DefaultBodyLimit::max(body_limit))
        // Attach state
        .with_state(state)
}

pub use file::*;
pub use health::*;
pub use login::*;
pub use raw::*;
