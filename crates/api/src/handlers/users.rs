//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::Json;
use barter_core::error::CoreError;
use barter_core::national_id;
use barter_db::models::user::{
    ProfileSummary, PublicProfile, UpdateProfile, UserListEntry, UserResponse,
};
use barter_db::repositories::UserRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/me
///
/// The caller's profile with item and proposal counts.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<ProfileSummary>>> {
    let summary = UserRepo::profile_summary(&state.pool, &user.national_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &user.national_id))?;
    Ok(Json(DataResponse { data: summary }))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    if input.is_empty() {
        return Err(CoreError::Validation("No fields to update".into()).into());
    }

    let updated = UserRepo::update_profile(&state.pool, &user.national_id, &input.normalized())
        .await?
        .ok_or_else(|| CoreError::not_found("User", &user.national_id))?;

    tracing::info!(national_id = %user.national_id, "Profile updated");
    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserListEntry>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{national_id}
///
/// Public profile only: name and address.
pub async fn public_profile(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(raw_id): Path<String>,
) -> AppResult<Json<DataResponse<PublicProfile>>> {
    let id = national_id::strip(&raw_id);
    let profile = UserRepo::find_public(&state.pool, &id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &id))?;
    Ok(Json(DataResponse { data: profile }))
}
