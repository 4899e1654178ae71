use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::auth_errors::AuthError;
use super::jwt::{TokenError, TokenIssuer, TokenPurpose};
use super::password::{PasswordError, PasswordHasher};
use super::registry::RefreshTokenRegistry;
use crate::notification::NotificationChannel;
use crate::user::{normalize_email, CredentialStore, NewUser, SubscriptionTier, User};

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthSession {
    fn new(user: User, tokens: TokenPair) -> Self {
        Self {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Orchestrates the account flows over the credential store, the refresh
/// token registry and the notification channel.
///
/// Every call into those collaborators is bounded by `io_timeout`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    refresh_tokens: Arc<dyn RefreshTokenRegistry>,
    notifier: Arc<dyn NotificationChannel>,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
    io_timeout: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        refresh_tokens: Arc<dyn RefreshTokenRegistry>,
        notifier: Arc<dyn NotificationChannel>,
        tokens: TokenIssuer,
        io_timeout: Duration,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            notifier,
            tokens,
            hasher: PasswordHasher::new(),
            io_timeout,
        }
    }

    #[cfg(test)]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthSession> {
        let email = normalize_email(email);

        if self.bounded(self.users.find_by_email(&email)).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .bounded(self.users.insert(NewUser {
                email,
                password_hash,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                subscription_tier: SubscriptionTier::Free,
            }))
            .await?;

        let tokens = self.issue_pair(user.id).await?;
        tracing::info!("Registered user {}", user.id);

        if let Err(e) = self.bounded(self.notifier.send_welcome(&user.email, first_name)).await {
            tracing::warn!("Welcome email to user {} failed: {}", user.id, e);
        }

        self.send_verification(&user).await?;

        Ok(AuthSession::new(user, tokens))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let user = self
            .bounded(self.users.find_by_email(&normalize_email(email)))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_pair(user.id).await?;
        tracing::info!("User {} logged in", user.id);

        Ok(AuthSession::new(user, tokens))
    }

    /// Revoke a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        if self.bounded(self.refresh_tokens.remove(refresh_token)).await? {
            tracing::debug!("Refresh token revoked");
        }
        Ok(())
    }

    /// Send a reset link if the email belongs to a user. Reports nothing
    /// either way so callers cannot probe which emails are registered.
    /// Store and delivery failures are logged only, never returned.
    pub async fn forgot_password(&self, email: &str) {
        if let Err(e) = self.try_send_reset(&normalize_email(email)).await {
            tracing::error!("Password reset request could not be completed: {}", e);
        }
    }

    async fn try_send_reset(&self, email: &str) -> Result<()> {
        let Some(user) = self.bounded(self.users.find_by_email(email)).await? else {
            return Ok(());
        };

        let token = self.tokens.issue_reset(user.id).map_err(signing_failed)?;
        self.bounded(self.notifier.send_password_reset(&user.email, &token))
            .await?;

        tracing::info!("Password reset link sent to user {}", user.id);
        Ok(())
    }

    /// Reset tokens are not consumed: one stays usable until it expires.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let user_id = self
            .tokens
            .verify(token, TokenPurpose::Reset)
            .and_then(|claims| claims.user_id())
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;

        let password_hash = self.hash_password(new_password).await?;

        if !self
            .bounded(self.users.update_password_hash(user_id, &password_hash))
            .await?
        {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        tracing::info!("Password reset for user {}", user_id);
        Ok(())
    }

    pub async fn verify_email(&self, token: &str) -> Result<User> {
        let user_id = self
            .tokens
            .verify(token, TokenPurpose::Verify)
            .and_then(|claims| claims.user_id())
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;

        let user = self
            .bounded(self.users.set_verified(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!("Email verified for user {}", user.id);
        Ok(user)
    }

    pub async fn resend_verification(&self, user_id: Uuid) -> Result<()> {
        let user = self
            .bounded(self.users.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        self.send_verification(&user).await
    }

    /// Redeem a refresh token for a new pair. The presented token is removed
    /// from the registry before the replacement is issued.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = match self.tokens.verify(refresh_token, TokenPurpose::Refresh) {
            Ok(claims) => claims,
            Err(_) => {
                self.prune(refresh_token).await;
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if !self.bounded(self.refresh_tokens.remove(refresh_token)).await? {
            return Err(AuthError::InvalidRefreshToken);
        }

        if self.bounded(self.users.find_by_id(user_id)).await?.is_none() {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.issue_pair(user_id).await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.bounded(self.users.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        let access_token = self.tokens.issue_access(user_id).map_err(signing_failed)?;
        let refresh_token = self.tokens.issue_refresh(user_id).map_err(signing_failed)?;

        let expires_at = Utc::now() + TokenPurpose::Refresh.lifetime();
        self.bounded(self.refresh_tokens.add(&refresh_token, user_id, expires_at))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn send_verification(&self, user: &User) -> Result<()> {
        let token = self.tokens.issue_verify(user.id).map_err(signing_failed)?;
        self.bounded(self.notifier.send_verification(&user.email, &token))
            .await?;

        tracing::info!("Verification email sent to user {}", user.id);
        Ok(())
    }

    /// Drop a refresh token that failed verification, if it was registered.
    async fn prune(&self, refresh_token: &str) {
        match self.bounded(self.refresh_tokens.remove(refresh_token)).await {
            Ok(true) => tracing::debug!("Pruned unusable refresh token from registry"),
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to prune refresh token: {}", e),
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = self.hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| match e {
                PasswordError::TooLong => AuthError::PasswordTooLong,
                PasswordError::Bcrypt(e) => AuthError::Internal(e.to_string()),
            })
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = self.hasher;
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn bounded<T, E, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        AuthError: From<E>,
    {
        match tokio::time::timeout(self.io_timeout, call).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::DeadlineExceeded),
        }
    }
}

fn signing_failed(err: TokenError) -> AuthError {
    tracing::error!("Token signing failed: {}", err);
    AuthError::Internal(err.to_string())
}
