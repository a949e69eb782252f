use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::PlatformStats;
use crate::shared::AppError;

/// Trait for the platform stats cache
///
/// The cache is a singleton: `replace_stats` has upsert semantics, the
/// refreshed view fully overwrites whatever was there before.
#[async_trait]
pub trait StatsRepository {
    async fn get_stats(&self) -> Result<Option<PlatformStats>, AppError>;
    async fn replace_stats(&self, stats: &PlatformStats) -> Result<(), AppError>;
}

/// In-memory implementation of StatsRepository for development and testing
pub struct InMemoryStatsRepository {
    stats: Mutex<Option<PlatformStats>>,
}

impl Default for InMemoryStatsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStatsRepository {
    /// Creates a new empty in-memory cache
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(None),
        }
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self))]
    async fn get_stats(&self) -> Result<Option<PlatformStats>, AppError> {
        let stats = self.stats.lock().unwrap();
        Ok(stats.clone())
    }

    #[instrument(skip(self, stats))]
    async fn replace_stats(&self, stats: &PlatformStats) -> Result<(), AppError> {
        debug!(total_raised = stats.total_raised, "Replacing platform stats in memory");

        let mut cached = self.stats.lock().unwrap();
        *cached = Some(stats.clone());

        Ok(())
    }
}

/// PostgreSQL implementation of the platform stats cache
///
/// Stored as a single fixed-id row so the upsert can target it directly.
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn get_stats(&self) -> Result<Option<PlatformStats>, AppError> {
        debug!("Fetching platform stats from database");

        let row = sqlx::query("SELECT * FROM platform_stats WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch platform stats from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|row| PlatformStats {
            total_users: row.get("total_users"),
            total_raised: row.get("total_raised"),
            total_donations: row.get("total_donations"),
            average_per_user: row.get("average_per_user"),
            top_donation: row.get("top_donation"),
            this_week: row.get("this_week"),
            this_month: row.get("this_month"),
            last_updated: row.get("last_updated"),
        }))
    }

    #[instrument(skip(self, stats))]
    async fn replace_stats(&self, stats: &PlatformStats) -> Result<(), AppError> {
        debug!(total_raised = stats.total_raised, "Upserting platform stats in database");

        sqlx::query(
            "INSERT INTO platform_stats (id, total_users, total_raised, total_donations, average_per_user, top_donation, this_week, this_month, last_updated) \
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
             total_users = EXCLUDED.total_users, total_raised = EXCLUDED.total_raised, \
             total_donations = EXCLUDED.total_donations, average_per_user = EXCLUDED.average_per_user, \
             top_donation = EXCLUDED.top_donation, this_week = EXCLUDED.this_week, \
             this_month = EXCLUDED.this_month, last_updated = EXCLUDED.last_updated",
        )
        .bind(stats.total_users)
        .bind(stats.total_raised)
        .bind(stats.total_donations)
        .bind(stats.average_per_user)
        .bind(stats.top_donation)
        .bind(stats.this_week)
        .bind(stats.this_month)
        .bind(stats.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to upsert platform stats in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn starts_empty() {
        let repo = InMemoryStatsRepository::new();
        assert!(repo.get_stats().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_overwrites_previous_snapshot() {
        let repo = InMemoryStatsRepository::new();

        let mut stats = PlatformStats::zeroed(Utc::now());
        stats.total_raised = 1_000;
        repo.replace_stats(&stats).await.unwrap();

        let mut newer = stats.clone();
        newer.total_raised = 2_500;
        newer.total_donations = 4;
        repo.replace_stats(&newer).await.unwrap();

        let cached = repo.get_stats().await.unwrap().unwrap();
        assert_eq!(cached.total_raised, 2_500);
        assert_eq!(cached.total_donations, 4);
    }
}
