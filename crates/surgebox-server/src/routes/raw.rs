//! Raw download of the current document.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /:token/api/raw
pub async fn get_raw(State(state): State<AppState>) -> ApiResult<Response> {
    let content = state.store.read_current().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"surge.conf\""),
        ],
        content,
    )
        .into_response())
}
