//! Handlers for the `/proposals` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use barter_core::proposal::ProposalStatus;
use barter_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use crate::engine::ProposalEngine;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ProposalListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /proposals`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProposalRequest {
    #[validate(range(min = 1, message = "offered_item_id must be a positive id"))]
    pub offered_item_id: DbId,
    #[validate(range(min = 1, message = "wanted_item_id must be a positive id"))]
    pub wanted_item_id: DbId,
}

/// Request body for `PUT /proposals/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: ProposalStatus,
}

/// POST /api/v1/proposals
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProposalRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let proposal = ProposalEngine::from_state(&state)
        .create(
            &user.national_id,
            input.offered_item_id,
            input.wanted_item_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// GET /api/v1/proposals/sent
pub async fn list_sent(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ProposalListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    let proposals = ProposalEngine::from_state(&state)
        .list_sent(&user.national_id, &filter)
        .await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/received
pub async fn list_received(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ProposalListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    let proposals = ProposalEngine::from_state(&state)
        .list_received(&user.national_id, &filter)
        .await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detail = ProposalEngine::from_state(&state)
        .get(id, &user.national_id)
        .await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/proposals/{id}/status
///
/// Accept or reject. Body: `{ "status": "accepted" | "rejected" }`.
pub async fn transition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<impl IntoResponse> {
    let proposal = ProposalEngine::from_state(&state)
        .transition(id, &user.national_id, input.status)
        .await?;
    Ok(Json(DataResponse { data: proposal }))
}

/// DELETE /api/v1/proposals/{id}
///
/// Cancel a pending proposal the caller made.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ProposalEngine::from_state(&state)
        .cancel(id, &user.national_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
