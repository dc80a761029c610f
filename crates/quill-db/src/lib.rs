//! # quill-db
//!
//! PostgreSQL database layer for quill.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, sessions, notes, labels, and
//!   collaborator grants
//! - The note visibility/search composer
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_core::{CreateNoteRequest, NoteRepository};
//! use quill_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/quill").await?;
//!
//!     let note = db
//!         .notes
//!         .create(owner_id, CreateNoteRequest {
//!             title: "Groceries".to_string(),
//!             description: "Oat milk, rye bread".to_string(),
//!         })
//!         .await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod collaborators;
pub mod labels;
pub mod notes;
pub mod pool;
pub mod sessions;
pub mod users;
pub mod visibility;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use quill_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use collaborators::PgCollaboratorRepository;
pub use labels::{validate_label_name, PgLabelRepository};
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use sessions::PgSessionRepository;
pub use users::PgUserRepository;
pub use visibility::PgNoteQueryRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User account repository.
    pub users: PgUserRepository,
    /// Session and password-reset token repository (authorization gate).
    pub sessions: PgSessionRepository,
    /// Note repository for CRUD and state-flag transitions.
    pub notes: PgNoteRepository,
    /// Label repository and note-label attachment.
    pub labels: PgLabelRepository,
    /// Collaborator grant repository.
    pub collaborators: PgCollaboratorRepository,
    /// Note visibility/search composer.
    pub queries: PgNoteQueryRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            labels: PgLabelRepository::new(pool.clone()),
            collaborators: PgCollaboratorRepository::new(pool.clone()),
            queries: PgNoteQueryRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
