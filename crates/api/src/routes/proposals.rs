//! Route definitions for the `/proposals` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::proposals;
use crate::state::AppState;

/// Routes mounted at `/proposals`. All require authentication.
///
/// ```text
/// POST   /              -> create
/// GET    /sent          -> list_sent
/// GET    /received      -> list_received
/// GET    /{id}          -> get_by_id
/// DELETE /{id}          -> cancel
/// PUT    /{id}/status   -> transition
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(proposals::create))
        .route("/sent", get(proposals::list_sent))
        .route("/received", get(proposals::list_received))
        .route(
            "/{id}",
            get(proposals::get_by_id).delete(proposals::cancel),
        )
        .route("/{id}/status", put(proposals::transition))
}
