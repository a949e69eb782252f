use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::types::{CreateUserRequest, GoalUpdateRequest, UserProfileResponse, UserResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new user
///
/// POST /api/user
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .user_service
        .create_user(request.name, request.email)
        .await?;

    Ok(Json(user.into()))
}

/// HTTP handler for fetching a user profile with recent donations
///
/// GET /api/user/:user_id
#[instrument(name = "get_user", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let profile = state.user_service.get_user_with_stats(&user_id).await?;

    Ok(Json(UserProfileResponse {
        user: profile.user.into(),
        recent_donations: profile
            .recent_donations
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}

/// HTTP handler for updating a user's fundraising goal
///
/// POST /api/user/:user_id/goal
#[instrument(name = "set_goal", skip(state))]
pub async fn set_goal(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<GoalUpdateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    info!(user_id = %user_id, goal = request.goal, "Updating fundraising goal");

    let user = state.user_service.set_goal(&user_id, request.goal).await?;

    Ok(Json(user.into()))
}
