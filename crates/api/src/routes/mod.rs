//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod attachments;
pub mod auth;
pub mod books;
pub mod health;

/// Creates the API router; protected routes get the auth middleware from `state`.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(books::protected_routes())
        .merge(attachments::protected_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(books::public_routes())
        .merge(attachments::public_routes())
        .merge(protected_routes)
}
