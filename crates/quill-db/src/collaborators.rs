//! Collaborator grant repository implementation.
//!
//! A grant belongs to the note's owner and names the invited user by email.
//! The email must resolve to a registered user at creation time; at read time
//! it is matched as-is.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quill_core::{new_v7, Collaborator, CollaboratorRepository, Error, Result};

/// PostgreSQL implementation of CollaboratorRepository.
#[derive(Clone)]
pub struct PgCollaboratorRepository {
    pool: Pool<Postgres>,
}

impl PgCollaboratorRepository {
    /// Create a new PgCollaboratorRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_collaborator_row(row: &sqlx::postgres::PgRow) -> Collaborator {
    Collaborator {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        note_id: row.get("note_id"),
        email: row.get("email"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl CollaboratorRepository for PgCollaboratorRepository {
    async fn add(&self, owner_id: Uuid, note_id: Uuid, email: &str) -> Result<Collaborator> {
        let id = new_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let note_owned: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM note WHERE id = $1 AND owner_id = $2")
                .bind(note_id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if note_owned.is_none() {
            return Err(Error::NoteNotFound(note_id));
        }

        // The invited email must belong to a registered user at grant time.
        let registered: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM app_user WHERE email = $1")
                .bind(email)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if registered.is_none() {
            return Err(Error::NotFound(format!(
                "Email {} is not registered",
                email
            )));
        }

        let result = sqlx::query(
            "INSERT INTO collaborator (id, owner_id, note_id, email, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (note_id, email) DO NOTHING",
        )
        .bind(id)
        .bind(owner_id)
        .bind(note_id)
        .bind(email)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "{} already collaborates on this note",
                email
            )));
        }

        tx.commit().await.map_err(Error::Database)?;

        Ok(Collaborator {
            id,
            owner_id,
            note_id,
            email: email.to_string(),
            created_at_utc: now,
        })
    }

    async fn remove(&self, owner_id: Uuid, note_id: Uuid, email: &str) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM collaborator WHERE owner_id = $1 AND note_id = $2 AND email = $3",
        )
        .bind(owner_id)
        .bind(note_id)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!(
                "No collaborator grant for {} on this note",
                email
            )));
        }
        Ok(())
    }

    async fn list_for_note(&self, note_id: Uuid) -> Result<Vec<Collaborator>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, note_id, email, created_at_utc
             FROM collaborator WHERE note_id = $1
             ORDER BY created_at_utc",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_collaborator_row).collect())
    }

    async fn is_collaborator(&self, note_id: Uuid, email: &str) -> Result<bool> {
        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM collaborator WHERE note_id = $1 AND email = $2",
        )
        .bind(note_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(exists.is_some())
    }
}
