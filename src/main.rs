mod auth;
mod db;
mod error;
mod middleware;
mod notification;
mod routes;
mod state;
mod user;

#[cfg(test)]
mod test_support;

use anyhow::Context;
use auth::{
    start_token_sweeper, AuthService, MemoryRefreshTokenRegistry, PgRefreshTokenRegistry,
    RefreshTokenRegistry, TokenIssuer,
};
use db::{create_pool, run_migrations};
use notification::{EmailService, LoggingChannel, NotificationChannel};
use routes::create_router;
use state::{AppState, Config, RefreshTokenStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user::UserRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,resume_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    let refresh_tokens: Arc<dyn RefreshTokenRegistry> = match config.refresh_token_store {
        RefreshTokenStore::Memory => Arc::new(MemoryRefreshTokenRegistry::new()),
        RefreshTokenStore::Postgres => Arc::new(PgRefreshTokenRegistry::new(db.clone())),
    };

    let notifier: Arc<dyn NotificationChannel> = match &config.email {
        Some(email) => Arc::new(EmailService::new(email).context("failed to configure SMTP")?),
        None => {
            tracing::warn!("SMTP_HOST not set; account emails will be logged, not sent");
            Arc::new(LoggingChannel::new(config.frontend_url.clone()))
        }
    };

    let auth_service = AuthService::new(
        Arc::new(UserRepository::new(db.clone())),
        refresh_tokens.clone(),
        notifier,
        TokenIssuer::new(&config.jwt_secret, &config.jwt_refresh_secret),
        config.io_timeout,
    );

    // Keep the scheduler alive for the lifetime of the server.
    let _sweeper = start_token_sweeper(refresh_tokens).await?;

    let app = create_router(AppState { auth_service });

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
