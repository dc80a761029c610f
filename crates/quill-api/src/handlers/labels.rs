//! Label HTTP handlers: CRUD plus note attachment.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::validate::FieldErrors;
use crate::{ApiError, AppState, AuthUser};
use quill_core::defaults::{NAME_MAX_LEN, NAME_MIN_LEN};
use quill_core::{Label, LabelRepository, NoteLabel};

#[derive(Debug, Deserialize)]
pub struct LabelBody {
    pub name: String,
}

/// Create a label. Duplicate names are permitted.
pub async fn create_label(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<LabelBody>,
) -> Result<(StatusCode, Json<Label>), ApiError> {
    let mut v = FieldErrors::new();
    v.require_len("name", &body.name, NAME_MIN_LEN, NAME_MAX_LEN);
    v.into_result()?;

    let label = state.db.labels.create(auth.user.id, &body.name).await?;
    info!(
        subsystem = "api",
        op = "create_label",
        user_id = %auth.user.id,
        label_id = %label.id,
        "Label created"
    );
    Ok((StatusCode::CREATED, Json(label)))
}

/// List the user's labels.
pub async fn list_labels(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Label>>, ApiError> {
    let labels = state.db.labels.list(auth.user.id).await?;
    Ok(Json(labels))
}

/// Fetch one of the user's labels by id.
pub async fn get_label(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Label>, ApiError> {
    let label = state.db.labels.fetch(auth.user.id, id).await?;
    Ok(Json(label))
}

/// Rename a label.
pub async fn rename_label(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<LabelBody>,
) -> Result<Json<Label>, ApiError> {
    let mut v = FieldErrors::new();
    v.require_len("name", &body.name, NAME_MIN_LEN, NAME_MAX_LEN);
    v.into_result()?;

    let label = state.db.labels.rename(auth.user.id, id, &body.name).await?;
    Ok(Json(label))
}

/// Delete a label. Its note attachments cascade away.
pub async fn delete_label(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.labels.delete(auth.user.id, id).await?;
    info!(
        subsystem = "api",
        op = "delete_label",
        user_id = %auth.user.id,
        label_id = %id,
        "Label deleted"
    );
    Ok(Json(serde_json::json!({ "message": "Label deleted" })))
}

/// Attach a label to a note. Both must be owned by the user; a repeat
/// attachment is a 409.
pub async fn attach_label(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((note_id, label_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<NoteLabel>), ApiError> {
    let attachment = state
        .db
        .labels
        .attach(auth.user.id, note_id, label_id)
        .await?;

    info!(
        subsystem = "api",
        op = "attach_label",
        user_id = %auth.user.id,
        note_id = %note_id,
        label_id = %label_id,
        "Label attached"
    );
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// Detach a label from a note. A missing attachment is a 404.
pub async fn detach_label(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((note_id, label_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .db
        .labels
        .detach(auth.user.id, note_id, label_id)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Label detached" })))
}
