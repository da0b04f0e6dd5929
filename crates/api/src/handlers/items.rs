//! Handlers for the `/items` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use barter_core::types::DbId;
use barter_db::models::item::{CreateItem, UpdateItem};
use validator::Validate;

use crate::engine::ItemCatalog;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::ItemListParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/items
///
/// Public listing of active items with `?category=&search=&page=&limit=`.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> AppResult<impl IntoResponse> {
    let (filter, page) = params.into_parts();
    let (data, meta) = ItemCatalog::from_state(&state).list(&filter, page).await?;
    Ok(Json(PageResponse { data, meta }))
}

/// GET /api/v1/items/mine
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let items = ItemCatalog::from_state(&state)
        .list_mine(&user.national_id)
        .await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/items
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateItem>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let item = ItemCatalog::from_state(&state)
        .create(&user.national_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/items/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = ItemCatalog::from_state(&state).get(id).await?;
    Ok(Json(DataResponse { data: item }))
}

/// PUT /api/v1/items/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateItem>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let item = ItemCatalog::from_state(&state)
        .update(id, &user.national_id, input)
        .await?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/items/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ItemCatalog::from_state(&state)
        .delete(id, &user.national_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
