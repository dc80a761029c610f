//! Collaborator grant HTTP handlers.

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
use quill_core::defaults::EMAIL_MAX_LEN;
use quill_core::{Collaborator, CollaboratorRepository, NoteRepository, Notification};

#[derive(Debug, Deserialize)]
pub struct CollaboratorBody {
    pub email: String,
}

/// Grant a registered user access to one of the owner's notes, then send the
/// invitation mail without blocking on delivery.
pub async fn add_collaborator(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<Uuid>,
    Json(body): Json<CollaboratorBody>,
) -> Result<(StatusCode, Json<Collaborator>), ApiError> {
    let mut v = FieldErrors::new();
    v.require_email("email", &body.email, EMAIL_MAX_LEN);
    v.into_result()?;

    let email = body.email.trim().to_lowercase();
    let grant = state
        .db
        .collaborators
        .add(auth.user.id, note_id, &email)
        .await?;

    // Grant creation is committed; the invitation is fire-and-forget.
    let note = state.db.notes.fetch(auth.user.id, note_id).await?;
    quill_notify::dispatch(
        state.notifier.clone(),
        Notification::CollaboratorInvite {
            note_id,
            note_title: note.title,
            owner_email: auth.user.email.clone(),
            recipient: email,
        },
    );

    info!(
        subsystem = "api",
        op = "add_collaborator",
        user_id = %auth.user.id,
        note_id = %note_id,
        "Collaborator added"
    );
    Ok((StatusCode::CREATED, Json(grant)))
}

/// Remove a collaborator grant from one of the owner's notes.
pub async fn remove_collaborator(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<Uuid>,
    Json(body): Json<CollaboratorBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = body.email.trim().to_lowercase();
    state
        .db
        .collaborators
        .remove(auth.user.id, note_id, &email)
        .await?;

    info!(
        subsystem = "api",
        op = "remove_collaborator",
        user_id = %auth.user.id,
        note_id = %note_id,
        "Collaborator removed"
    );
    Ok(Json(serde_json::json!({ "message": "Collaborator removed" })))
}
