use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::registry::RefreshTokenRegistry;
use crate::user::StoreError;

/// Refresh token registry persisted in the `refresh_tokens` table, shared by
/// every instance pointed at the same database.
#[derive(Clone)]
pub struct PgRefreshTokenRegistry {
    pool: PgPool,
}

impl PgRefreshTokenRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRegistry for PgRefreshTokenRegistry {
    async fn add(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<bool, StoreError> {
        let removed: Option<DateTime<Utc>> = sqlx::query_scalar(
            "DELETE FROM refresh_tokens WHERE token = $1 RETURNING expires_at",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(removed.map(|expires_at| expires_at > Utc::now()).unwrap_or(false))
    }

    async fn contains(&self, token: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM refresh_tokens WHERE token = $1 AND expires_at > NOW())",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
