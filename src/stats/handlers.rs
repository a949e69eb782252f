use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use super::models::{LeaderboardEntry, PlatformStats};
use super::service::DEFAULT_LEADERBOARD_LIMIT;
use crate::shared::{AppError, AppState};

/// Query parameters for the leaderboard endpoint
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// HTTP handler for platform-wide statistics
///
/// GET /api/stats
/// Refreshes the cached aggregates before returning them
#[instrument(name = "get_stats", skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<PlatformStats>, AppError> {
    let stats = state.stats_service.get_platform_stats().await?;

    Ok(Json(stats))
}

/// HTTP handler for the leaderboard view
///
/// GET /api/leaderboard?limit=10
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let leaderboard = state.stats_service.get_leaderboard(limit).await?;

    Ok(Json(leaderboard))
}
