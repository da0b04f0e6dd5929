//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. All require authentication.
///
/// ```text
/// GET  /                -> list
/// GET  /me              -> me
/// PUT  /me              -> update_me
/// GET  /{national_id}   -> public_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/me", get(users::me).put(users::update_me))
        .route("/{national_id}", get(users::public_profile))
}
