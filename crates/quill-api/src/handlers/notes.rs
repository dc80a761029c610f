//! Note HTTP handlers: CRUD, state-flag transitions, and the four read
//! views composed by the visibility layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::validate::FieldErrors;
use crate::{ApiError, AppState, AuthUser};
use quill_core::defaults::{
    DESCRIPTION_MAX_LEN, DESCRIPTION_MIN_LEN, DESCRIPTION_UPDATE_MAX_LEN, TITLE_MAX_LEN,
    TITLE_MIN_LEN,
};
use quill_core::{
    CreateNoteRequest, Note, NoteCard, NotePage, NoteQueryRepository, NoteRepository,
    UpdateNoteContentRequest,
};

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ColourBody {
    pub colour: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// 1-based page number; the page size is a server constant.
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

// =============================================================================
// CRUD HANDLERS
// =============================================================================

/// Create a note owned by the authenticated user.
pub async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let mut v = FieldErrors::new();
    v.require_len("title", &body.title, TITLE_MIN_LEN, TITLE_MAX_LEN);
    v.require_len(
        "description",
        &body.description,
        DESCRIPTION_MIN_LEN,
        DESCRIPTION_MAX_LEN,
    );
    v.into_result()?;

    let note = state
        .db
        .notes
        .create(
            auth.user.id,
            CreateNoteRequest {
                title: body.title.trim().to_string(),
                description: body.description.trim().to_string(),
            },
        )
        .await?;

    info!(
        subsystem = "api",
        op = "create_note",
        user_id = %auth.user.id,
        note_id = %note.id,
        "Note created"
    );
    Ok((StatusCode::CREATED, Json(note)))
}

/// Fetch one of the user's own notes by id.
pub async fn get_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.db.notes.fetch(auth.user.id, id).await?;
    Ok(Json(note))
}

/// Update title/description as the owner or a collaborator.
pub async fn update_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<Json<Note>, ApiError> {
    let mut v = FieldErrors::new();
    v.require_len("title", &body.title, TITLE_MIN_LEN, TITLE_MAX_LEN);
    v.require_len(
        "description",
        &body.description,
        DESCRIPTION_MIN_LEN,
        DESCRIPTION_UPDATE_MAX_LEN,
    );
    v.into_result()?;

    let note = state
        .db
        .notes
        .update_content(
            &auth.user,
            id,
            UpdateNoteContentRequest {
                title: body.title.trim().to_string(),
                description: body.description.trim().to_string(),
            },
        )
        .await?;

    info!(
        subsystem = "api",
        op = "update_note",
        user_id = %auth.user.id,
        note_id = %id,
        "Note updated"
    );
    Ok(Json(note))
}

/// Delete one of the user's own notes. Association rows cascade.
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.notes.delete(auth.user.id, id).await?;
    info!(
        subsystem = "api",
        op = "delete_note",
        user_id = %auth.user.id,
        note_id = %id,
        "Note deleted"
    );
    Ok(Json(serde_json::json!({ "message": "Note deleted" })))
}

// =============================================================================
// STATE-FLAG HANDLERS
// =============================================================================

/// Pin a note (clears archived).
pub async fn pin_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.db.notes.pin(auth.user.id, id).await?;
    Ok(Json(note))
}

/// Unpin a note.
pub async fn unpin_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.db.notes.unpin(auth.user.id, id).await?;
    Ok(Json(note))
}

/// Archive a note (clears pinned).
pub async fn archive_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.db.notes.archive(auth.user.id, id).await?;
    Ok(Json(note))
}

/// Unarchive a note.
pub async fn unarchive_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state.db.notes.unarchive(auth.user.id, id).await?;
    Ok(Json(note))
}

/// Recolour a note from the fixed palette.
pub async fn colour_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ColourBody>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .db
        .notes
        .set_colour(auth.user.id, id, &body.colour)
        .await?;
    Ok(Json(note))
}

// =============================================================================
// READ VIEWS
// =============================================================================

/// Default list: active notes the user owns or collaborates on.
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<NotePage>, ApiError> {
    let page = state
        .db
        .queries
        .list_active(&auth.user, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// The user's pinned notes.
pub async fn pinned_notes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.db.queries.pinned(&auth.user).await?;
    Ok(Json(notes))
}

/// The user's archived notes, label-annotated and paginated.
pub async fn archived_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<NotePage>, ApiError> {
    let page = state
        .db
        .queries
        .archived(&auth.user, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// Case-insensitive search over title, description, and label names.
pub async fn search_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<NoteCard>>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Search key must not be empty".to_string(),
        ));
    }

    let hits = state.db.queries.search(&auth.user, query.q.trim()).await?;
    Ok(Json(hits))
}
