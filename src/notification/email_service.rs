//! SMTP delivery of account emails via lettre.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::notification_channel::{
    dashboard_url, reset_url, verification_url, DeliveryError, NotificationChannel,
};
use crate::state::EmailConfig;

const PRODUCT_NAME: &str = "Resume Builder";

#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());

        // Port 465 style implicit TLS when SMTP_SECURE=true, STARTTLS otherwise.
        let builder = if config.smtp_secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        };

        let mailer = builder
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let from = format!("{} <{}>", PRODUCT_NAME, config.from_email)
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(config.from_email.clone()))?;

        Ok(Self {
            mailer,
            from,
            frontend_url: config.frontend_url.clone(),
        })
    }

    async fn send_html(&self, to: &str, subject: &str, html: String) -> Result<(), DeliveryError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| DeliveryError::InvalidAddress(to.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

fn action_email(heading: &str, intro: &str, url: &str, label: &str, color: &str, footer: &str) -> String {
    format!(
        r##"<div style="max-width: 600px; margin: auto; padding: 20px; font-family: Arial;">
  <h1 style="text-align: center; color: #2563eb;">{PRODUCT_NAME}</h1>
  <div style="background: #f8fafc; padding: 30px; border-radius: 8px;">
    <h2>{heading}</h2>
    <p>{intro}</p>
    <div style="text-align: center; margin: 20px 0;">
      <a href="{url}" style="background: {color}; color: white; padding: 12px 24px; border-radius: 6px; text-decoration: none;">{label}</a>
    </div>
    <p>If the button doesn't work, copy and paste this link into your browser:</p>
    <a href="{url}">{url}</a>
  </div>
  <p style="text-align: center; font-size: 12px; color: #64748b;">{footer}</p>
</div>"##
    )
}

fn welcome_email(first_name: &str, dashboard: &str) -> String {
    format!(
        r##"<div style="max-width: 600px; margin: auto; padding: 20px; font-family: Arial;">
  <h1 style="text-align: center; color: #2563eb;">Welcome, {first_name}</h1>
  <div style="background: #f8fafc; padding: 30px; border-radius: 8px;">
    <p>Thanks for joining {PRODUCT_NAME}. We're excited to help you craft the perfect resume!</p>
    <div style="text-align: center; margin: 20px 0;">
      <a href="{dashboard}" style="background: #2563eb; color: white; padding: 12px 24px; border-radius: 6px; text-decoration: none;">Go to Dashboard</a>
    </div>
  </div>
</div>"##
    )
}

#[async_trait]
impl NotificationChannel for EmailService {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), DeliveryError> {
        let url = verification_url(&self.frontend_url, token);
        let html = action_email(
            "Verify Your Email",
            "Click the button below to verify your email address:",
            &url,
            "Verify Email",
            "#2563eb",
            "This link expires in 24 hours.",
        );

        self.send_html(email, "Verify Your Email Address", html).await
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), DeliveryError> {
        let url = reset_url(&self.frontend_url, token);
        let html = action_email(
            "Reset Your Password",
            "Click the button below to reset your password:",
            &url,
            "Reset Password",
            "#dc2626",
            "This link expires in 1 hour.",
        );

        self.send_html(email, "Reset Your Password", html).await
    }

    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), DeliveryError> {
        let html = welcome_email(first_name, &dashboard_url(&self.frontend_url));
        self.send_html(email, &format!("Welcome to {}!", PRODUCT_NAME), html)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_email_embeds_link() {
        let html = action_email(
            "Reset Your Password",
            "intro",
            "https://app/reset-password?token=t",
            "Reset Password",
            "#dc2626",
            "This link expires in 1 hour.",
        );

        assert_eq!(html.matches("https://app/reset-password?token=t").count(), 3);
        assert!(html.contains("This link expires in 1 hour."));
    }

    #[test]
    fn test_welcome_email_greets_by_name() {
        let html = welcome_email("Ada", "https://app/dashboard");
        assert!(html.contains("Welcome, Ada"));
        assert!(html.contains("https://app/dashboard"));
    }
}
