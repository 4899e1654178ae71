use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::user::StoreError;

/// Server-side record of the refresh tokens that may currently be redeemed.
///
/// A refresh token with a valid signature is still rejected unless it is
/// present here.
#[async_trait]
pub trait RefreshTokenRegistry: Send + Sync {
    async fn add(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Returns `true` only if a live entry was removed by this call. Of two
    /// concurrent removals of the same token at most one sees `true`.
    async fn remove(&self, token: &str) -> Result<bool, StoreError>;

    async fn contains(&self, token: &str) -> Result<bool, StoreError>;

    /// Drop entries whose expiry has passed, returning how many went.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone, Copy)]
struct RegisteredToken {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

impl RegisteredToken {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Process-local registry for single-instance deployments.
#[derive(Clone, Default)]
pub struct MemoryRefreshTokenRegistry {
    tokens: Arc<DashMap<String, RegisteredToken>>,
}

impl MemoryRefreshTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl RefreshTokenRegistry for MemoryRefreshTokenRegistry {
    async fn add(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.tokens
            .insert(token.to_string(), RegisteredToken { user_id, expires_at });
        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<bool, StoreError> {
        let now = Utc::now();
        Ok(self
            .tokens
            .remove(token)
            .map(|(_, entry)| entry.is_live(now))
            .unwrap_or(false))
    }

    async fn contains(&self, token: &str) -> Result<bool, StoreError> {
        let now = Utc::now();
        Ok(self
            .tokens
            .get(token)
            .map(|entry| entry.is_live(now))
            .unwrap_or(false))
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut purged = 0u64;
        self.tokens.retain(|_, entry| {
            let keep = entry.is_live(now);
            if !keep {
                purged += 1;
                tracing::debug!("Evicting expired refresh token for user {}", entry.user_id);
            }
            keep
        });
        Ok(purged)
    }
}
