//! Error types for quill.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using quill's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for quill operations.
///
/// Every variant maps to a stable machine code via [`Error::code`]; the API
/// layer maps codes onto the HTTP status taxonomy (400/401/404/409/500).
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found (or not visible to the acting user)
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Label not found (or not owned by the acting user)
    #[error("Label not found: {0}")]
    LabelNotFound(Uuid),

    /// Authentication failed (missing/invalid/expired/revoked token)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Duplicate association or identity (collaborator grant, note-label row, email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Colour name outside the fixed palette
    #[error("Invalid colour: {0}")]
    InvalidColour(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notify(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine code for this error, independent of the human message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(_) => "database",
            Error::NotFound(_) => "not_found",
            Error::NoteNotFound(_) => "note_not_found",
            Error::LabelNotFound(_) => "label_not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Conflict(_) => "conflict",
            Error::InvalidColour(_) => "invalid_colour",
            Error::InvalidInput(_) => "invalid_input",
            Error::Notify(_) => "notify",
            Error::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Notify(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidInput(format!("invalid JSON: {}", e))
    }
}
