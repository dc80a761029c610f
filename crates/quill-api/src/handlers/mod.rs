//! HTTP handlers, one module per resource.

pub mod collaborators;
pub mod labels;
pub mod notes;
pub mod users;
