use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::user_models::{NewUser, User};

#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Which constraint is not reported.
    #[error("Record already exists")]
    AlreadyExists,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Typed gateway over the persistent user record store.
///
/// Emails passed in are expected to be normalized already
/// (see [`super::user_models::normalize_email`]).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::AlreadyExists`] when the email is taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Returns `false` when no user with `id` exists.
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    /// Marks the email as verified and returns the updated row, if any.
    async fn set_verified(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}
