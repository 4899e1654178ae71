pub mod credential_store;
pub mod user_models;
pub mod user_repository;

pub use credential_store::{CredentialStore, StoreError};
pub use user_models::{normalize_email, NewUser, SubscriptionTier, User, UserResponse};
pub use user_repository::UserRepository;
