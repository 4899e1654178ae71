use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Auth(err) => {
                let status = match err {
                    AuthError::AlreadyExists | AuthError::AlreadyVerified => StatusCode::CONFLICT,
                    AuthError::InvalidCredentials | AuthError::InvalidRefreshToken => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthError::InvalidOrExpiredToken | AuthError::PasswordTooLong => {
                        StatusCode::BAD_REQUEST
                    }
                    AuthError::UserNotFound => StatusCode::NOT_FOUND,
                    AuthError::DeliveryFailed(e) => {
                        tracing::error!("Email delivery failed: {:?}", e);
                        return (
                            StatusCode::BAD_GATEWAY,
                            "Failed to deliver email".to_string(),
                        );
                    }
                    AuthError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
                    AuthError::Store(e) => {
                        tracing::error!("Store error: {:?}", e);
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Database error occurred".to_string(),
                        );
                    }
                    AuthError::Internal(e) => {
                        tracing::error!("Internal error: {}", e);
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Internal server error".to_string(),
                        );
                    }
                };
                (status, err.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
