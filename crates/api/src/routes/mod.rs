pub mod auth;
pub mod health;
pub mod items;
pub mod proposals;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth        register, login
/// /users       profile, directory
/// /items       catalog
/// /proposals   negotiation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/items", items::router())
        .nest("/proposals", proposals::router())
}
