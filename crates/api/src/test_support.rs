//! Helpers for router tests backed by an in-memory database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bookcrossing_core::auth::hash_password;
use bookcrossing_core::user::NewUser;
use bookcrossing_db::{Migrator, UserRepository, connect};
use bookcrossing_shared::config::DatabaseConfig;
use bookcrossing_shared::{EmailConfig, EmailService, JwtConfig, JwtService};
use http_body_util::BodyExt;
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub const PASSWORD: &str = "123456";

/// State over a fresh migrated SQLite database. E-mail delivery is disabled.
pub async fn test_state() -> AppState {
    let db = connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(JwtConfig::default())),
        email_service: Arc::new(EmailService::new(EmailConfig::default())),
        attachment_max_bytes: 1024,
    }
}

/// Inserts a user and returns its ID.
pub async fn create_user(state: &AppState, login: &str, enabled: bool) -> i32 {
    UserRepository::new((*state.db).clone())
        .insert(
            NewUser {
                login: login.to_string(),
                name: login.to_string(),
                email: format!("{login}@example.com"),
                city: None,
                password_hash: hash_password(PASSWORD).expect("should hash"),
            },
            enabled,
        )
        .await
        .expect("Failed to create user")
        .id
}

/// Inserts an enabled user and returns an access token for it.
pub async fn login_as(state: &AppState, login: &str) -> String {
    let id = create_user(state, login, true).await;
    state
        .jwt_service
        .generate_access_token(id, login)
        .expect("should generate token")
}

/// Runs one request through the full router and decodes the JSON body.
pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = send_raw(state, request).await;
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response should be JSON")
    };
    (status, body)
}

/// Runs one request through the full router and returns the raw body.
pub async fn send_raw(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let app: Router = create_router(state.clone());
    let response = app.oneshot(request).await.expect("request should complete");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec();
    (status, bytes)
}
