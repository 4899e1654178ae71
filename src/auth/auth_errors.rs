use thiserror::Error;

use super::password::MAX_PASSWORD_BYTES;
use crate::notification::DeliveryError;
use crate::user::StoreError;

/// Outcome of a failed authentication flow.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User already exists")]
    AlreadyExists,

    /// Returned for an unknown email and for a wrong password alike.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already verified")]
    AlreadyVerified,

    #[error("Password must be at most {} bytes", MAX_PASSWORD_BYTES)]
    PasswordTooLong,

    /// The state change was committed but the email could not be sent.
    #[error("Failed to deliver email: {0}")]
    DeliveryFailed(#[from] DeliveryError),

    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    #[error("Deadline exceeded waiting for an external service")]
    DeadlineExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => AuthError::AlreadyExists,
            other => AuthError::Store(other),
        }
    }
}
