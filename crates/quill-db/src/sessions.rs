//! Session and password-reset token repository.
//!
//! This is the persistence behind the authorization gate: tokens are opaque
//! random secrets handed to the client once, stored only as SHA-256 hex
//! digests. `resolve` rejects malformed, unknown, expired, and revoked
//! tokens; logout marks the row revoked so an otherwise-unexpired token stops
//! resolving immediately.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quill_core::defaults::{
    RESET_TOKEN_PREFIX, RESET_TOKEN_TTL_MINUTES, SESSION_TOKEN_PREFIX, SESSION_TTL_HOURS,
    TOKEN_SECRET_LEN,
};
use quill_core::{new_v7, Error, IssuedToken, Result, Session, SessionRepository, User};

use crate::users::map_user_row;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    /// Create a new PgSessionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a secret using SHA256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn issue(&self, user_id: Uuid) -> Result<IssuedToken> {
        let now = Utc::now();
        let id = new_v7();
        let token = format!("{}{}", SESSION_TOKEN_PREFIX, Self::generate_secret(TOKEN_SECRET_LEN));
        let token_hash = Self::hash_secret(&token);
        let expires_at = now + Duration::hours(SESSION_TTL_HOURS);

        sqlx::query(
            "INSERT INTO session (id, user_id, token_hash, expires_at, revoked, created_at_utc)
             VALUES ($1, $2, $3, $4, false, $5)",
        )
        .bind(id)
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(IssuedToken {
            token,
            session: Session {
                id,
                user_id,
                token_hash,
                expires_at,
                revoked: false,
                created_at_utc: now,
                last_used_at: None,
            },
        })
    }

    async fn resolve(&self, token: &str) -> Result<Option<User>> {
        if !token.starts_with(SESSION_TOKEN_PREFIX) {
            return Ok(None);
        }

        let hash = Self::hash_secret(token);
        let now = Utc::now();

        let row = sqlx::query(
            r#"SELECT u.id, u.firstname, u.lastname, u.email, u.password_hash, u.created_at_utc
            FROM session s
            JOIN app_user u ON u.id = s.user_id
            WHERE s.token_hash = $1
              AND s.revoked = false
              AND s.expires_at > $2"#,
        )
        .bind(&hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if row.is_some() {
            sqlx::query("UPDATE session SET last_used_at = $1 WHERE token_hash = $2")
                .bind(now)
                .bind(&hash)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        }

        Ok(row.as_ref().map(map_user_row))
    }

    async fn revoke(&self, token: &str) -> Result<bool> {
        let hash = Self::hash_secret(token);
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE session SET revoked = true, revoked_at = $1
             WHERE token_hash = $2 AND revoked = false",
        )
        .bind(now)
        .bind(&hash)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_reset_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let token = format!("{}{}", RESET_TOKEN_PREFIX, Self::generate_secret(TOKEN_SECRET_LEN));
        let token_hash = Self::hash_secret(&token);
        let expires_at = now + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        sqlx::query(
            "INSERT INTO password_reset (id, user_id, token_hash, expires_at, created_at_utc)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(token)
    }

    async fn consume_reset_token(&self, token: &str) -> Result<Option<Uuid>> {
        if !token.starts_with(RESET_TOKEN_PREFIX) {
            return Ok(None);
        }

        let hash = Self::hash_secret(token);
        let now = Utc::now();

        // Single statement: validity, expiry, and single-use are checked and
        // consumed atomically.
        let row = sqlx::query(
            "UPDATE password_reset SET used_at = $1
             WHERE token_hash = $2 AND used_at IS NULL AND expires_at > $1
             RETURNING user_id",
        )
        .bind(now)
        .bind(&hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("user_id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_secret_is_deterministic() {
        let a = PgSessionRepository::hash_secret("qn_at_sample");
        let b = PgSessionRepository::hash_secret("qn_at_sample");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256 hex
    }

    #[test]
    fn test_generate_secret_length_and_charset() {
        let secret = PgSessionRepository::generate_secret(48);
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = PgSessionRepository::generate_secret(48);
        let b = PgSessionRepository::generate_secret(48);
        assert_ne!(a, b);
    }
}
