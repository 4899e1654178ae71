pub mod auth_dto;
pub mod auth_errors;
pub mod auth_handlers;
pub mod auth_repository;
pub mod auth_service;
pub mod jwt;
pub mod password;
pub mod registry;
pub mod token_sweeper;

pub use auth_errors::AuthError;
pub use auth_repository::PgRefreshTokenRegistry;
pub use auth_service::AuthService;
pub use jwt::{TokenIssuer, TokenPurpose};
pub use registry::{MemoryRefreshTokenRegistry, RefreshTokenRegistry};
pub use token_sweeper::start_token_sweeper;
