//! Profile routes
//!
//! User profile create / get / update. No authentication is applied here.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::{Created, JsonBody};
use crate::app::AppState;
use crate::domain::{CreateProfileRequest, Profile, UpdateProfileRequest};
use crate::error::{ApiError, ApiResult};

/// POST /profiles
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateProfileRequest>,
) -> ApiResult<Created<Profile>> {
    let profile = state.profiles.create(&req).await?;
    Ok(Created(profile))
}

/// GET /profiles/:user_id
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.profiles.get(&user_id).await?))
}

/// PUT or PATCH /profiles/:user_id
///
/// Partial update: omitted fields keep their stored values.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.profiles.update(&user_id, &req).await?))
}

/// Profile paths without an id segment
pub async fn missing_user_id() -> ApiError {
    ApiError::validation("userId is required")
}
