use std::time::Duration;
use thiserror::Error;

use crate::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} has an invalid value: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenStore {
    Memory,
    Postgres,
}

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_secure: bool,
    pub from_email: String,
    pub frontend_url: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub frontend_url: String,
    /// `None` when SMTP_HOST is unset; links are logged instead of mailed.
    pub email: Option<EmailConfig>,
    pub refresh_token_store: RefreshTokenStore,
    pub io_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = required("JWT_SECRET")?;
        let jwt_refresh_secret = required("JWT_REFRESH_SECRET")?;
        if jwt_secret == jwt_refresh_secret {
            return Err(ConfigError::Invalid(
                "JWT_REFRESH_SECRET",
                "must differ from JWT_SECRET".to_string(),
            ));
        }

        let frontend_url = or_default("FRONTEND_URL", "http://localhost:5173");

        let email = match var("SMTP_HOST") {
            Some(smtp_host) => Some(EmailConfig {
                smtp_host,
                smtp_port: parse("SMTP_PORT", &or_default("SMTP_PORT", "465"))?,
                smtp_user: required("SMTP_USER")?,
                smtp_pass: required("SMTP_PASS")?,
                smtp_secure: or_default("SMTP_SECURE", "false") == "true",
                from_email: required("FROM_EMAIL")?,
                frontend_url: frontend_url.clone(),
            }),
            None => None,
        };

        let refresh_token_store = match or_default("REFRESH_TOKEN_STORE", "memory").as_str() {
            "memory" => RefreshTokenStore::Memory,
            "postgres" => RefreshTokenStore::Postgres,
            other => return Err(ConfigError::Invalid("REFRESH_TOKEN_STORE", other.to_string())),
        };

        let io_timeout_secs: u64 = parse(
            "AUTH_IO_TIMEOUT_SECS",
            &or_default("AUTH_IO_TIMEOUT_SECS", "10"),
        )?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret,
            jwt_refresh_secret,
            frontend_url,
            email,
            refresh_token_store,
            io_timeout: Duration::from_secs(io_timeout_secs),
            host: or_default("HOST", "127.0.0.1"),
            port: parse("PORT", &or_default("PORT", "3000"))?,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid(key, value.to_string()))
}
