/// Access token model
///
/// One row per issued bearer token. Login inserts a row, logout deletes the
/// row behind the token that made the request, and every authenticated
/// request resolves its token here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE access_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name TEXT NOT NULL,
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::{generate_token, hash_token};

/// Name given to tokens issued by the login endpoint
pub const LOGIN_TOKEN_NAME: &str = "api";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccessToken {
    pub id: Uuid,

    /// User the token authenticates as
    pub user_id: Uuid,

    pub name: String,

    /// SHA-256 hex of the plaintext
    #[serde(skip_serializing)]
    pub token_hash: String,

    pub created_at: DateTime<Utc>,

    /// Last time the token authenticated a request
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Issues a new token for `user_id`
    ///
    /// Returns the stored row and the plaintext token. The plaintext cannot
    /// be recovered later.
    pub async fn issue(pool: &PgPool, user_id: Uuid, name: &str) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, token_hash) = generate_token();

        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            INSERT INTO access_tokens (user_id, name, token_hash)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, token_hash, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(token_hash)
        .fetch_one(pool)
        .await?;

        Ok((token, plaintext))
    }

    /// Looks up a plaintext token and stamps `last_used_at`
    ///
    /// Returns `None` for unknown or revoked tokens.
    pub async fn resolve(pool: &PgPool, plaintext: &str) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            UPDATE access_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
            RETURNING id, user_id, name, token_hash, created_at, last_used_at
            "#,
        )
        .bind(hash_token(plaintext))
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Deletes one token belonging to `user_id`
    ///
    /// Other tokens of the same user are untouched.
    pub async fn revoke(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of live tokens for a user
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
