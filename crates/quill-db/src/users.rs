//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quill_core::{new_v7, CreateUserRequest, Error, Result, User, UserRepository};

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a database row to a User.
pub(crate) fn map_user_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        firstname: row.get("firstname"),
        lastname: row.get("lastname"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO app_user (id, firstname, lastname, email, password_hash, created_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&req.firstname)
        .bind(&req.lastname)
        .bind(&req.email)
        .bind(&req.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return Error::Conflict(format!("Email {} is already registered", req.email));
                }
            }
            Error::Database(e)
        })?;

        Ok(User {
            id,
            firstname: req.firstname,
            lastname: req.lastname,
            email: req.email,
            password_hash: req.password_hash,
            created_at_utc: now,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, firstname, lastname, email, password_hash, created_at_utc
             FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;

        Ok(map_user_row(&row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, firstname, lastname, email, password_hash, created_at_utc
             FROM app_user WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(map_user_row))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE app_user SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
