use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Outbound delivery of account emails. Each send may fail independently.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), DeliveryError>;

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), DeliveryError>;

    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), DeliveryError>;
}

/// Writes links to the log instead of sending mail. Used when SMTP is not configured.
#[derive(Clone)]
pub struct LoggingChannel {
    frontend_url: String,
}

impl LoggingChannel {
    pub fn new(frontend_url: String) -> Self {
        Self { frontend_url }
    }
}

#[async_trait]
impl NotificationChannel for LoggingChannel {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), DeliveryError> {
        tracing::info!(
            "Verification link for {}: {}",
            email,
            verification_url(&self.frontend_url, token)
        );
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), DeliveryError> {
        tracing::info!(
            "Password reset link for {}: {}",
            email,
            reset_url(&self.frontend_url, token)
        );
        Ok(())
    }

    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), DeliveryError> {
        tracing::info!("Welcome email for {} ({})", email, first_name);
        Ok(())
    }
}

pub fn verification_url(frontend_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={}", frontend_url.trim_end_matches('/'), token)
}

pub fn reset_url(frontend_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", frontend_url.trim_end_matches('/'), token)
}

pub fn dashboard_url(frontend_url: &str) -> String {
    format!("{}/dashboard", frontend_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_building() {
        assert_eq!(
            verification_url("https://app.example.com/", "abc"),
            "https://app.example.com/verify-email?token=abc"
        );
        assert_eq!(
            reset_url("https://app.example.com", "xyz"),
            "https://app.example.com/reset-password?token=xyz"
        );
        assert_eq!(
            dashboard_url("http://localhost:5173"),
            "http://localhost:5173/dashboard"
        );
    }

    #[tokio::test]
    async fn test_logging_channel_never_fails() {
        let channel = LoggingChannel::new("http://localhost:5173".to_string());
        assert!(channel.send_verification("a@x.com", "t").await.is_ok());
        assert!(channel.send_password_reset("a@x.com", "t").await.is_ok());
        assert!(channel.send_welcome("a@x.com", "A").await.is_ok());
    }
}
