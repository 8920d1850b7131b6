//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for books, attachments and accounts
//! - Authentication middleware
//! - Error-to-response mapping

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::Router;
use bookcrossing_shared::{EmailService, JwtService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Email service for sending emails.
    pub email_service: Arc<EmailService>,
    /// Largest accepted attachment, in bytes.
    pub attachment_max_bytes: usize,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    routes::api_routes_with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
