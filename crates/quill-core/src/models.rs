//! Data model types shared across quill crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// `password_hash` is an Argon2id PHC string and is never serialized.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Public projection of a user (what `GET /api/user` returns).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
        }
    }
}

/// A note owned by exactly one user.
///
/// `pinned` and `archived` are mutually exclusive; the repository transitions
/// keep the pair consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub pinned: bool,
    pub archived: bool,
    pub colour: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// A named tag owned by a user. Names are not unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Association row attaching a label to a note, scoped by the attaching user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteLabel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub note_id: Uuid,
    pub label_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
}

/// Collaborator grant: the user with `email` may view/update `note_id`.
///
/// The row belongs to the note's owner, not the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub note_id: Uuid,
    pub email: String,
    pub created_at_utc: DateTime<Utc>,
}

/// A persisted login session. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at_utc: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// A note as returned by the visibility composer: the row itself plus the
/// label names and collaborator emails joined onto it (both possibly empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCard {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub pinned: bool,
    pub archived: bool,
    pub colour: String,
    pub labels: Vec<String>,
    pub collaborators: Vec<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// One page of composed notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotePage {
    pub notes: Vec<NoteCard>,
    /// Total matching notes across all pages.
    pub total: i64,
    /// 1-based page number this response covers.
    pub page: i64,
    pub page_size: i64,
}

impl NotePage {
    /// True if more pages follow this one.
    pub fn has_more(&self) -> bool {
        self.page * self.page_size < self.total
    }
}

/// Outbound notification payloads handed to a [`crate::Notifier`].
///
/// Delivery is fire-and-forget; no caller treats it as a correctness
/// dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    CollaboratorInvite {
        note_id: Uuid,
        note_title: String,
        owner_email: String,
        recipient: String,
    },
    PasswordReset {
        recipient: String,
        token: String,
    },
}

impl Notification {
    /// Recipient email address for this notification.
    pub fn recipient(&self) -> &str {
        match self {
            Notification::CollaboratorInvite { recipient, .. } => recipient,
            Notification::PasswordReset { recipient, .. } => recipient,
        }
    }
}
