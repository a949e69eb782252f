use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::donation::repository::DonationRepository;
use crate::donation::service::DonationService;
use crate::stats::repository::StatsRepository;
use crate::stats::service::StatsService;
use crate::user::repository::UserRepository;
use crate::user::service::UserService;

/// Shared application state containing all dependencies
///
/// Services are built once and shared: the donation service owns the
/// per-user lock map, so it must outlive individual requests.
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub donation_repository: Arc<dyn DonationRepository + Send + Sync>,
    pub stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    pub user_service: Arc<UserService>,
    pub donation_service: Arc<DonationService>,
    pub stats_service: Arc<StatsService>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        donation_repository: Arc<dyn DonationRepository + Send + Sync>,
        stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    ) -> Self {
        let stats_service = Arc::new(StatsService::new(
            Arc::clone(&user_repository),
            Arc::clone(&donation_repository),
            Arc::clone(&stats_repository),
        ));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&user_repository),
            Arc::clone(&donation_repository),
        ));
        let donation_service = Arc::new(DonationService::new(
            Arc::clone(&user_repository),
            Arc::clone(&donation_repository),
            Arc::clone(&stats_service),
        ));

        Self {
            user_repository,
            donation_repository,
            stats_repository,
            user_service,
            donation_service,
            stats_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    #[allow(dead_code)] // Reserved for optimistic-concurrency guards
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    #[allow(dead_code)] // Catch-all for unexpected failures
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::donation::repository::InMemoryDonationRepository;
    use crate::stats::repository::InMemoryStatsRepository;
    use crate::user::repository::InMemoryUserRepository;

    /// Builder for creating AppState with overrides for testing
    ///
    /// Defaults every collection to its in-memory repository, so most
    /// tests only override what they care about.
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        donation_repository: Option<Arc<dyn DonationRepository + Send + Sync>>,
        stats_repository: Option<Arc<dyn StatsRepository + Send + Sync>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                donation_repository: None,
                stats_repository: None,
            }
        }

        pub fn with_user_repository(mut self, repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_donation_repository(
            mut self,
            repo: Arc<dyn DonationRepository + Send + Sync>,
        ) -> Self {
            self.donation_repository = Some(repo);
            self
        }

        pub fn with_stats_repository(
            mut self,
            repo: Arc<dyn StatsRepository + Send + Sync>,
        ) -> Self {
            self.stats_repository = Some(repo);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.user_repository
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                self.donation_repository
                    .unwrap_or_else(|| Arc::new(InMemoryDonationRepository::new())),
                self.stats_repository
                    .unwrap_or_else(|| Arc::new(InMemoryStatsRepository::new())),
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
