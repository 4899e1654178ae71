use crate::{
    auth::{
        auth_dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse,
            RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenPairResponse,
            VerifyEmailRequest, VerifyEmailResponse,
        },
        auth_handlers,
    },
    middleware::auth_middleware,
    state::AppState,
    user::{SubscriptionTier, UserResponse},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::forgot_password,
        auth_handlers::reset_password,
        auth_handlers::verify_email,
        auth_handlers::resend_verification,
        auth_handlers::refresh_token,
        auth_handlers::me,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            VerifyEmailRequest,
            RefreshTokenRequest,
            AuthResponse,
            TokenPairResponse,
            VerifyEmailResponse,
            MessageResponse,
            UserResponse,
            SubscriptionTier,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Protected routes (access token required)
    let session_routes = Router::new()
        .route("/me", get(auth_handlers::me))
        .route("/resend-verification", post(auth_handlers::resend_verification))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let auth_routes = Router::new()
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login))
        .route("/logout", post(auth_handlers::logout))
        .route("/forgot-password", post(auth_handlers::forgot_password))
        .route("/reset-password", post(auth_handlers::reset_password))
        .route("/verify-email", post(auth_handlers::verify_email))
        .route("/refresh-token", post(auth_handlers::refresh_token))
        .merge(session_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::PasswordHasher, AuthService, MemoryRefreshTokenRegistry, TokenIssuer};
    use crate::test_support::{InMemoryCredentialStore, RecordingChannel};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<RecordingChannel>) {
        let mail = Arc::new(RecordingChannel::default());
        let auth_service = AuthService::new(
            Arc::new(InMemoryCredentialStore::default()),
            Arc::new(MemoryRefreshTokenRegistry::new()),
            mail.clone(),
            TokenIssuer::new("route-access", "route-refresh"),
            Duration::from_secs(5),
        )
        .with_hasher(PasswordHasher::with_cost(4));

        (create_router(AppState { auth_service }), mail)
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn register(app: &Router) -> Value {
        let (status, body) = call(
            app,
            post_json(
                "/api/auth/register",
                json!({
                    "email": "a@x.com",
                    "password": "Secret123!",
                    "firstName": "A",
                    "lastName": "B"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_register_and_fetch_profile() {
        let (app, _) = app();
        let body = register(&app).await;
        assert_eq!(body["user"]["email"], "a@x.com");
        assert_eq!(body["user"]["isEmailVerified"], false);
        assert!(body["user"].get("passwordHash").is_none());

        let access = body["accessToken"].as_str().unwrap();
        let (status, profile) = call(
            &app,
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {}", access))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["firstName"], "A");
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let (app, _) = app();
        register(&app).await;

        let (status, body) = call(
            &app,
            post_json(
                "/api/auth/register",
                json!({
                    "email": "a@x.com",
                    "password": "Secret123!",
                    "firstName": "A",
                    "lastName": "B"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "User already exists");
    }

    #[tokio::test]
    async fn test_validation_rejects_short_password() {
        let (app, _) = app();
        let (status, _) = call(
            &app,
            post_json(
                "/api/auth/register",
                json!({
                    "email": "a@x.com",
                    "password": "short",
                    "firstName": "A",
                    "lastName": "B"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_protected_routes_require_access_token() {
        let (app, _) = app();
        let body = register(&app).await;

        let (status, _) = call(
            &app,
            Request::get("/api/auth/me").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // A refresh token is not an access token.
        let refresh = body["refreshToken"].as_str().unwrap();
        let (status, _) = call(
            &app,
            Request::post("/api/auth/resend-verification")
                .header(header::AUTHORIZATION, format!("Bearer {}", refresh))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_rotation_over_http() {
        let (app, _) = app();
        let body = register(&app).await;
        let refresh = body["refreshToken"].as_str().unwrap().to_string();

        let (status, rotated) = call(
            &app,
            post_json("/api/auth/refresh-token", json!({ "refreshToken": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(rotated["refreshToken"], json!(refresh));

        let (status, _) = call(
            &app,
            post_json("/api/auth/refresh-token", json!({ "refreshToken": refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forgot_password_responses_match() {
        let (app, mail) = app();
        register(&app).await;

        let known = call(
            &app,
            post_json("/api/auth/forgot-password", json!({ "email": "a@x.com" })),
        )
        .await;
        let unknown = call(
            &app,
            post_json("/api/auth/forgot-password", json!({ "email": "nobody@x.com" })),
        )
        .await;

        assert_eq!(known, unknown);
        assert_eq!(known.0, StatusCode::OK);
        assert_eq!(mail.reset_tokens_for("a@x.com").len(), 1);
    }

    #[tokio::test]
    async fn test_verify_email_over_http() {
        let (app, mail) = app();
        register(&app).await;
        let token = mail.verification_tokens_for("a@x.com").remove(0);

        let (status, body) = call(
            &app,
            post_json("/api/auth/verify-email", json!({ "token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["isEmailVerified"], true);

        let (status, _) = call(
            &app,
            post_json("/api/auth/verify-email", json!({ "token": "garbage" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
