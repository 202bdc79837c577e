//! Document endpoints: read, save, rollback, upload and version delete.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surgebox_core::{DocumentSnapshot, SurgeError};
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

use super::login::OkResponse;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct RollbackResponse {
    pub ok: bool,
    #[serde(rename = "rolledBackTo")]
    pub rolled_back_to: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub sha: Option<String>,
}

/// Either response shape of a PUT.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SaveResponse {
    Saved(OkResponse),
    RolledBack(RollbackResponse),
}

/// Current document, its history and the live hash.
/// GET /:token/api/file
pub async fn get_file(State(state): State<AppState>) -> ApiResult<Json<DocumentSnapshot>> {
    let snapshot = state.store.snapshot().await?;
    Ok(Json(snapshot))
}

/// Save new content or roll back to a stored version.
/// PUT /:token/api/file
///
/// A string `rollbackTo` wins over `content` when both are present.
pub async fn put_file(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<SaveResponse>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| SurgeError::validation(format!("Invalid JSON body: {}", e)))?;

    if let Some(hash) = payload.get("rollbackTo").and_then(Value::as_str) {
        state.store.rollback_to(hash).await?;
        info!(hash = %hash, "rolled back");
        return Ok(Json(SaveResponse::RolledBack(RollbackResponse {
            ok: true,
            rolled_back_to: hash.to_string(),
        })));
    }

    if let Some(content) = payload.get("content").and_then(Value::as_str) {
        let outcome = state.store.write_current(content).await?;
        info!(hash = %outcome.hash, appended = outcome.appended, "document saved");
        return Ok(Json(SaveResponse::Saved(OkResponse { ok: true })));
    }

    Err(SurgeError::validation_with_suggestion(
        "Expected a string `content` or `rollbackTo`",
        "Send {\"content\": \"...\"} to save or {\"rollbackTo\": \"<sha256>\"} to roll back",
    )
    .into())
}

fn multipart_error(err: MultipartError, limit: usize) -> SurgeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SurgeError::payload_too_large(limit)
    } else {
        SurgeError::validation(err.to_string())
    }
}

/// Replace the document with an uploaded file.
/// POST /:token/api/file
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<OkResponse>> {
    let limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if data.len() > limit {
            return Err(SurgeError::payload_too_large(limit).into());
        }
        let text = String::from_utf8(data.to_vec())
            .map_err(|_| SurgeError::validation("File is not valid UTF-8 text"))?;

        let outcome = state.store.write_current(&text).await?;
        info!(hash = %outcome.hash, size = text.len(), "document uploaded");
        return Ok(Json(OkResponse { ok: true }));
    }

    Err(SurgeError::missing_field(UPLOAD_FIELD).into())
}

/// Remove a non-current version.
/// DELETE /:token/api/file?sha=<hash>
pub async fn delete_file_version(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<OkResponse>> {
    let hash = params
        .sha
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SurgeError::missing_field("sha"))?;

    if state.store.delete_version(&hash).await? {
        info!(hash = %hash, "version deleted");
    }
    Ok(Json(OkResponse { ok: true }))
}
