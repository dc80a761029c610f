//! Label repository implementation.
//!
//! Labels are owner-scoped; names are deliberately not unique. Attachment is
//! an association row keyed by (note, label, attaching user); a duplicate
//! attach attempt is a conflict, never a second row.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quill_core::{new_v7, Error, Label, LabelRepository, NoteLabel, Result};

/// Validate a label name.
///
/// Rules: length between 2-100 characters after trimming.
pub fn validate_label_name(name: &str) -> std::result::Result<(), String> {
    let trimmed = name.trim();
    if trimmed.len() < 2 {
        return Err("Label name must be at least 2 characters".to_string());
    }
    if trimmed.len() > 100 {
        return Err("Label name must be 100 characters or less".to_string());
    }
    Ok(())
}

/// PostgreSQL implementation of LabelRepository.
#[derive(Clone)]
pub struct PgLabelRepository {
    pool: Pool<Postgres>,
}

impl PgLabelRepository {
    /// Create a new PgLabelRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_label_row(row: &sqlx::postgres::PgRow) -> Label {
    Label {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl LabelRepository for PgLabelRepository {
    async fn create(&self, owner_id: Uuid, name: &str) -> Result<Label> {
        validate_label_name(name).map_err(Error::InvalidInput)?;

        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO label (id, owner_id, name, created_at_utc) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name.trim())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Label {
            id,
            owner_id,
            name: name.trim().to_string(),
            created_at_utc: now,
        })
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Label>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, created_at_utc
             FROM label WHERE owner_id = $1
             ORDER BY name, created_at_utc",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_label_row).collect())
    }

    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Label> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, created_at_utc
             FROM label WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::LabelNotFound(id))?;

        Ok(map_label_row(&row))
    }

    async fn rename(&self, owner_id: Uuid, id: Uuid, name: &str) -> Result<Label> {
        validate_label_name(name).map_err(Error::InvalidInput)?;

        let row = sqlx::query(
            "UPDATE label SET name = $3 WHERE id = $1 AND owner_id = $2
             RETURNING id, owner_id, name, created_at_utc",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::LabelNotFound(id))?;

        Ok(map_label_row(&row))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        // note_label rows referencing this label cascade away with it.
        let result = sqlx::query("DELETE FROM label WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::LabelNotFound(id));
        }
        Ok(())
    }

    async fn attach(&self, user_id: Uuid, note_id: Uuid, label_id: Uuid) -> Result<NoteLabel> {
        let id = new_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Both lookups are scoped by the acting user.
        let note_owned: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM note WHERE id = $1 AND owner_id = $2")
                .bind(note_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if note_owned.is_none() {
            return Err(Error::NoteNotFound(note_id));
        }

        let label_owned: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM label WHERE id = $1 AND owner_id = $2")
                .bind(label_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if label_owned.is_none() {
            return Err(Error::LabelNotFound(label_id));
        }

        let result = sqlx::query(
            "INSERT INTO note_label (id, user_id, note_id, label_id, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (note_id, label_id, user_id) DO NOTHING",
        )
        .bind(id)
        .bind(user_id)
        .bind(note_id)
        .bind(label_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict("Note already has this label".to_string()));
        }

        tx.commit().await.map_err(Error::Database)?;

        Ok(NoteLabel {
            id,
            user_id,
            note_id,
            label_id,
            created_at_utc: now,
        })
    }

    async fn detach(&self, user_id: Uuid, note_id: Uuid, label_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM note_label WHERE note_id = $1 AND label_id = $2 AND user_id = $3",
        )
        .bind(note_id)
        .bind(label_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "No such label attachment for this note".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_label_name_bounds() {
        assert!(validate_label_name("ok").is_ok());
        assert!(validate_label_name("x").is_err());
        assert!(validate_label_name(&"a".repeat(101)).is_err());
        assert!(validate_label_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_label_name_trims() {
        assert!(validate_label_name("  a  ").is_err());
        assert!(validate_label_name("  ab  ").is_ok());
    }
}
