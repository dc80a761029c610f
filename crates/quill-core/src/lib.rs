//! # quill-core
//!
//! Core types, traits, and abstractions for quill, a note-taking backend.
//!
//! This crate provides:
//! - The shared data model (users, notes, labels, association rows, sessions)
//! - Repository traits implemented by `quill-db`
//! - The error taxonomy with stable machine codes
//! - The fixed note colour palette
//! - Default constants and structured-logging field names

pub mod defaults;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod palette;
pub mod traits;

pub use error::{Error, Result};
pub use ids::new_v7;
pub use models::{
    Collaborator, Label, Note, NoteCard, NoteLabel, NotePage, Notification, Session, User,
    UserProfile,
};
pub use palette::{colour_names, resolve_colour, DEFAULT_COLOUR};
pub use traits::{
    CollaboratorRepository, CreateNoteRequest, CreateUserRequest, IssuedToken, LabelRepository,
    NoteQueryRepository, NoteRepository, Notifier, SessionRepository, UpdateNoteContentRequest,
    UserRepository,
};
