//! Core traits for quill abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Request for creating a new user account. The password arrives already
/// hashed; repositories never see plaintext credentials.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
}

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails with `Conflict` when the email is taken.
    async fn create(&self, req: CreateUserRequest) -> Result<User>;

    /// Fetch a user by id.
    async fn fetch(&self, id: Uuid) -> Result<User>;

    /// Look up a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Replace the stored password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

// =============================================================================
// SESSION REPOSITORY (authorization gate)
// =============================================================================

/// A freshly issued session: the opaque token (shown once) and its record.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub session: Session,
}

/// Repository backing the authorization gate.
///
/// `resolve` is the gate itself: every authenticated operation calls it first
/// and short-circuits before touching any other store when it returns `None`.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Issue a new session token for a user.
    async fn issue(&self, user_id: Uuid) -> Result<IssuedToken>;

    /// Resolve a bearer token to its user.
    ///
    /// Returns `None` for malformed, unknown, expired, and revoked tokens.
    async fn resolve(&self, token: &str) -> Result<Option<User>>;

    /// Revoke a session token (logout). Returns true if a live session was
    /// revoked.
    async fn revoke(&self, token: &str) -> Result<bool>;

    /// Issue a one-time password-reset token with a bounded validity window.
    async fn create_reset_token(&self, user_id: Uuid) -> Result<String>;

    /// Consume a reset token: validates hash, expiry, and single-use, marks
    /// it used, and returns the owning user id.
    async fn consume_reset_token(&self, token: &str) -> Result<Option<Uuid>>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub description: String,
}

/// Request for replacing a note's content (title + description).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNoteContentRequest {
    pub title: String,
    pub description: String,
}

/// Repository for note CRUD and state-flag transitions.
///
/// State-flag transitions (pin/unpin/archive/unarchive/recolour) are
/// owner-only and atomic: pinning an archived note clears `archived` in the
/// same statement that sets `pinned`, and vice versa. Transitions on a note
/// already in the requested state are silent no-ops returning current state.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a note owned by `owner_id`.
    async fn create(&self, owner_id: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by id, scoped to its owner.
    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Note>;

    /// Update title/description as the owner or a collaborator.
    ///
    /// Fails with `NoteNotFound` when the actor is neither.
    async fn update_content(
        &self,
        actor: &User,
        id: Uuid,
        req: UpdateNoteContentRequest,
    ) -> Result<Note>;

    /// Delete a note, scoped to its owner. Association rows cascade.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;

    /// Pin a note, clearing `archived` atomically if set.
    async fn pin(&self, owner_id: Uuid, id: Uuid) -> Result<Note>;

    /// Clear the pinned flag.
    async fn unpin(&self, owner_id: Uuid, id: Uuid) -> Result<Note>;

    /// Archive a note, clearing `pinned` atomically if set.
    async fn archive(&self, owner_id: Uuid, id: Uuid) -> Result<Note>;

    /// Clear the archived flag.
    async fn unarchive(&self, owner_id: Uuid, id: Uuid) -> Result<Note>;

    /// Recolour a note. The name is validated against the fixed palette;
    /// unknown names fail with `InvalidColour` and leave the note unchanged.
    async fn set_colour(&self, owner_id: Uuid, id: Uuid, colour_name: &str) -> Result<Note>;
}

// =============================================================================
// LABEL REPOSITORY
// =============================================================================

/// Repository for labels and note-label attachment.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Create a label. Duplicate names are permitted.
    async fn create(&self, owner_id: Uuid, name: &str) -> Result<Label>;

    /// List the user's labels.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Label>>;

    /// Fetch a label by id, scoped to its owner.
    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Label>;

    /// Rename a label.
    async fn rename(&self, owner_id: Uuid, id: Uuid, name: &str) -> Result<Label>;

    /// Delete a label. Attached note-label rows cascade.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()>;

    /// Attach a label to a note. Both must exist scoped to `user_id`;
    /// an existing (note, label, user) association fails with `Conflict`.
    async fn attach(&self, user_id: Uuid, note_id: Uuid, label_id: Uuid) -> Result<NoteLabel>;

    /// Detach a label from a note. A missing association fails with
    /// `NotFound`.
    async fn detach(&self, user_id: Uuid, note_id: Uuid, label_id: Uuid) -> Result<()>;
}

// =============================================================================
// COLLABORATOR REPOSITORY
// =============================================================================

/// Repository for collaborator grants.
#[async_trait]
pub trait CollaboratorRepository: Send + Sync {
    /// Grant a registered user (by email) access to a note owned by
    /// `owner_id`.
    ///
    /// Fails with `NoteNotFound` when the owner does not own the note,
    /// `NotFound` when the email is not registered, and `Conflict` when the
    /// (note, email) grant already exists.
    async fn add(&self, owner_id: Uuid, note_id: Uuid, email: &str) -> Result<Collaborator>;

    /// Remove a grant. Fails with `NotFound` when absent.
    async fn remove(&self, owner_id: Uuid, note_id: Uuid, email: &str) -> Result<()>;

    /// All grants on a note.
    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Collaborator>>;

    /// Whether `email` holds a grant on `note_id`.
    async fn is_collaborator(&self, note_id: Uuid, email: &str) -> Result<bool>;
}

// =============================================================================
// VISIBILITY / QUERY COMPOSER
// =============================================================================

/// The note visibility and search composer.
///
/// Computes, for a given user, the note set for each read view, applying the
/// ownership-or-collaboration rule and annotating rows with joined label
/// names and collaborator emails. Rows are deduplicated by note id before
/// returning; left-join fan-out never multiplies results.
#[async_trait]
pub trait NoteQueryRepository: Send + Sync {
    /// Default list view: unpinned, unarchived notes the user owns or
    /// collaborates on, annotated, paginated at the fixed page size.
    async fn list_active(&self, user: &User, page: i64) -> Result<NotePage>;

    /// The user's own pinned notes.
    async fn pinned(&self, user: &User) -> Result<Vec<Note>>;

    /// The user's own archived notes, label-annotated, paginated.
    async fn archived(&self, user: &User, page: i64) -> Result<NotePage>;

    /// Case-insensitive substring search over title, description, and
    /// attached label names, restricted to notes the user owns or
    /// collaborates on. A miss is an empty vec, not an error.
    async fn search(&self, user: &User, key: &str) -> Result<Vec<NoteCard>>;
}

// =============================================================================
// NOTIFIER
// =============================================================================

/// Outbound notification delivery.
///
/// Callers dispatch without awaiting the outcome; a delivery failure must
/// never fail or roll back the operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a single notification.
    async fn notify(&self, notification: &Notification) -> Result<()>;
}
