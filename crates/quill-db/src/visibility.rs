//! Note visibility and search composer.
//!
//! Computes, for a given user, the note set for each read view. Visibility
//! is ownership OR a collaborator grant matching the user's email. Label
//! names and collaborator emails are left-joined onto each row and collapsed
//! with `GROUP BY` + `array_agg(DISTINCT ...)`, so join fan-out (a note with
//! two labels) never multiplies result rows.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use quill_core::defaults::PAGE_SIZE;
use quill_core::{Error, Note, NoteCard, NotePage, NoteQueryRepository, Result, User};

use crate::escape_like;
use crate::notes::map_note_row;

/// PostgreSQL implementation of NoteQueryRepository.
#[derive(Clone)]
pub struct PgNoteQueryRepository {
    pool: Pool<Postgres>,
}

impl PgNoteQueryRepository {
    /// Create a new PgNoteQueryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Annotated note columns shared by the composed views.
const CARD_COLUMNS: &str = r#"
    n.id, n.owner_id, n.title, n.description, n.pinned, n.archived, n.colour,
    n.created_at_utc, n.updated_at_utc,
    array_remove(array_agg(DISTINCT l.name), NULL) AS labels,
    array_remove(array_agg(DISTINCT c.email), NULL) AS collaborators
"#;

/// Visibility predicate: the acting user owns the note or holds a grant.
const VISIBLE_TO_USER: &str = r#"
    (n.owner_id = $1 OR EXISTS (
        SELECT 1 FROM collaborator cx
        WHERE cx.note_id = n.id AND cx.email = $2))
"#;

fn map_card_row(row: &sqlx::postgres::PgRow) -> NoteCard {
    NoteCard {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        description: row.get("description"),
        pinned: row.get("pinned"),
        archived: row.get("archived"),
        colour: row.get("colour"),
        labels: row.get("labels"),
        collaborators: row.get("collaborators"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

#[async_trait]
impl NoteQueryRepository for PgNoteQueryRepository {
    async fn list_active(&self, user: &User, page: i64) -> Result<NotePage> {
        let page = page.max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM note n
             WHERE n.pinned = false AND n.archived = false AND {VISIBLE_TO_USER}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS}
             FROM note n
             LEFT JOIN note_label nl ON nl.note_id = n.id
             LEFT JOIN label l ON l.id = nl.label_id
             LEFT JOIN collaborator c ON c.note_id = n.id
             WHERE n.pinned = false AND n.archived = false AND {VISIBLE_TO_USER}
             GROUP BY n.id
             ORDER BY n.created_at_utc DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "visibility",
            op = "list_active",
            user_id = %user.id,
            result_count = rows.len(),
            total,
            "Composed active note list"
        );

        Ok(NotePage {
            notes: rows.iter().map(map_card_row).collect(),
            total,
            page,
            page_size: PAGE_SIZE,
        })
    }

    async fn pinned(&self, user: &User) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, title, description, pinned, archived, colour,
                    created_at_utc, updated_at_utc
             FROM note
             WHERE owner_id = $1 AND pinned = true
             ORDER BY created_at_utc DESC",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_note_row).collect())
    }

    async fn archived(&self, user: &User, page: i64) -> Result<NotePage> {
        let page = page.max(1);
        let offset = (page - 1) * PAGE_SIZE;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM note n WHERE n.owner_id = $1 AND n.archived = true",
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        // Archived view is owner-only and label-annotated; collaborator
        // annotation is not part of this view.
        let rows = sqlx::query(
            r#"SELECT
                n.id, n.owner_id, n.title, n.description, n.pinned, n.archived, n.colour,
                n.created_at_utc, n.updated_at_utc,
                array_remove(array_agg(DISTINCT l.name), NULL) AS labels
            FROM note n
            LEFT JOIN note_label nl ON nl.note_id = n.id
            LEFT JOIN label l ON l.id = nl.label_id
            WHERE n.owner_id = $1 AND n.archived = true
            GROUP BY n.id
            ORDER BY n.created_at_utc DESC
            LIMIT $2 OFFSET $3"#,
        )
        .bind(user.id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let notes = rows
            .iter()
            .map(|row| NoteCard {
                id: row.get("id"),
                owner_id: row.get("owner_id"),
                title: row.get("title"),
                description: row.get("description"),
                pinned: row.get("pinned"),
                archived: row.get("archived"),
                colour: row.get("colour"),
                labels: row.get("labels"),
                collaborators: Vec::new(),
                created_at_utc: row.get("created_at_utc"),
                updated_at_utc: row.get("updated_at_utc"),
            })
            .collect();

        Ok(NotePage {
            notes,
            total,
            page,
            page_size: PAGE_SIZE,
        })
    }

    async fn search(&self, user: &User, key: &str) -> Result<Vec<NoteCard>> {
        let pattern = format!("%{}%", escape_like(key));

        // Visibility AND field-match: the two conditions group independently,
        // with the label match expressed as its own EXISTS so it cannot leak
        // notes the user has no access to.
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS}
             FROM note n
             LEFT JOIN note_label nl ON nl.note_id = n.id
             LEFT JOIN label l ON l.id = nl.label_id
             LEFT JOIN collaborator c ON c.note_id = n.id
             WHERE {VISIBLE_TO_USER}
               AND (n.title ILIKE $3
                    OR n.description ILIKE $3
                    OR EXISTS (
                        SELECT 1 FROM note_label nl2
                        JOIN label l2 ON l2.id = nl2.label_id
                        WHERE nl2.note_id = n.id AND l2.name ILIKE $3))
             GROUP BY n.id
             ORDER BY n.created_at_utc DESC"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "visibility",
            op = "search",
            user_id = %user.id,
            result_count = rows.len(),
            "Composed search result"
        );

        Ok(rows.iter().map(map_card_row).collect())
    }
}
