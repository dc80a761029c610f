//! Note repository implementation.
//!
//! State-flag transitions are single owner-scoped UPDATE statements, so the
//! pinned/archived exclusivity holds at every observable point: pinning an
//! archived note clears `archived` in the same statement that sets `pinned`.
//! A transition on a note already in the requested state is a silent no-op
//! that returns current state; only a missing (or foreign) note errors.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quill_core::palette::{resolve_colour, DEFAULT_COLOUR};
use quill_core::{
    new_v7, CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteContentRequest, User,
};

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Run a state-flag transition and map a missing row to `NoteNotFound`.
    async fn transition(&self, sql: &str, owner_id: Uuid, id: Uuid) -> Result<Note> {
        let row = sqlx::query(sql)
            .bind(id)
            .bind(owner_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;

        Ok(map_note_row(&row))
    }
}

const NOTE_COLUMNS: &str =
    "id, owner_id, title, description, pinned, archived, colour, created_at_utc, updated_at_utc";

/// Map a database row to a Note.
pub(crate) fn map_note_row(row: &sqlx::postgres::PgRow) -> Note {
    Note {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        description: row.get("description"),
        pinned: row.get("pinned"),
        archived: row.get("archived"),
        colour: row.get("colour"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, owner_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO note (id, owner_id, title, description, pinned, archived, colour,
                               created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, false, false, $5, $6, $6)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(DEFAULT_COLOUR)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Note {
            id,
            owner_id,
            title: req.title,
            description: req.description,
            pinned: false,
            archived: false,
            colour: DEFAULT_COLOUR.to_string(),
            created_at_utc: now,
            updated_at_utc: now,
        })
    }

    async fn fetch(&self, owner_id: Uuid, id: Uuid) -> Result<Note> {
        let row = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(id))?;

        Ok(map_note_row(&row))
    }

    async fn update_content(
        &self,
        actor: &User,
        id: Uuid,
        req: UpdateNoteContentRequest,
    ) -> Result<Note> {
        // Content updates are allowed for the owner and for collaborators
        // (matched by email). State flags are untouched.
        let row = sqlx::query(&format!(
            "UPDATE note SET title = $3, description = $4, updated_at_utc = $5
             WHERE id = $1
               AND (owner_id = $2 OR EXISTS (
                    SELECT 1 FROM collaborator c
                    WHERE c.note_id = note.id AND c.email = $6))
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(actor.id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(Utc::now())
        .bind(&actor.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(id))?;

        Ok(map_note_row(&row))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        // Owner-scoped: a collaborator (or anyone else) deleting by id alone
        // must read as not-found.
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn pin(&self, owner_id: Uuid, id: Uuid) -> Result<Note> {
        self.transition(
            &format!(
                "UPDATE note SET pinned = true, archived = false, updated_at_utc = $3
                 WHERE id = $1 AND owner_id = $2
                 RETURNING {NOTE_COLUMNS}"
            ),
            owner_id,
            id,
        )
        .await
    }

    async fn unpin(&self, owner_id: Uuid, id: Uuid) -> Result<Note> {
        self.transition(
            &format!(
                "UPDATE note SET pinned = false, updated_at_utc = $3
                 WHERE id = $1 AND owner_id = $2
                 RETURNING {NOTE_COLUMNS}"
            ),
            owner_id,
            id,
        )
        .await
    }

    async fn archive(&self, owner_id: Uuid, id: Uuid) -> Result<Note> {
        self.transition(
            &format!(
                "UPDATE note SET archived = true, pinned = false, updated_at_utc = $3
                 WHERE id = $1 AND owner_id = $2
                 RETURNING {NOTE_COLUMNS}"
            ),
            owner_id,
            id,
        )
        .await
    }

    async fn unarchive(&self, owner_id: Uuid, id: Uuid) -> Result<Note> {
        self.transition(
            &format!(
                "UPDATE note SET archived = false, updated_at_utc = $3
                 WHERE id = $1 AND owner_id = $2
                 RETURNING {NOTE_COLUMNS}"
            ),
            owner_id,
            id,
        )
        .await
    }

    async fn set_colour(&self, owner_id: Uuid, id: Uuid, colour_name: &str) -> Result<Note> {
        // Palette validation happens before any write, so an unknown name
        // leaves the stored colour untouched.
        let rgb = resolve_colour(colour_name)?;

        let row = sqlx::query(&format!(
            "UPDATE note SET colour = $3, updated_at_utc = $4
             WHERE id = $1 AND owner_id = $2
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .bind(rgb)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::NoteNotFound(id))?;

        Ok(map_note_row(&row))
    }
}
