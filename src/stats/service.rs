use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use super::models::{LeaderboardEntry, PlatformStats};
use super::repository::StatsRepository;
use crate::donation::repository::DonationRepository;
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Number of leaderboard rows returned when the caller does not ask for more
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Service recomputing platform-wide aggregates and the leaderboard view
///
/// The refresh is a full scan over users and the donation ledger. It may
/// observe a donation whose user update is still in flight; the next
/// refresh converges, which is acceptable for this workload.
pub struct StatsService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    donation_repository: Arc<dyn DonationRepository + Send + Sync>,
    stats_repository: Arc<dyn StatsRepository + Send + Sync>,
}

impl StatsService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        donation_repository: Arc<dyn DonationRepository + Send + Sync>,
        stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    ) -> Self {
        Self {
            user_repository,
            donation_repository,
            stats_repository,
        }
    }

    /// Recomputes every aggregate from scratch and overwrites the cache
    #[instrument(skip(self))]
    pub async fn refresh_platform_stats(&self) -> Result<PlatformStats, AppError> {
        debug!("Recomputing platform stats");

        let now = Utc::now();
        let total_users = self.user_repository.count_users().await?;
        let aggregate = self.donation_repository.aggregate().await?;
        let this_week = self
            .donation_repository
            .sum_since(now - Duration::days(7))
            .await?;
        let this_month = self
            .donation_repository
            .sum_since(now - Duration::days(30))
            .await?;

        let average_per_user = if total_users > 0 {
            ((aggregate.total_raised as f64) / (total_users as f64)).round() as i64
        } else {
            0
        };

        let stats = PlatformStats {
            total_users,
            total_raised: aggregate.total_raised,
            total_donations: aggregate.total_donations,
            average_per_user,
            top_donation: aggregate.top_donation,
            this_week,
            this_month,
            last_updated: now,
        };

        self.stats_repository.replace_stats(&stats).await?;

        info!(
            total_users = stats.total_users,
            total_raised = stats.total_raised,
            total_donations = stats.total_donations,
            "Platform stats refreshed"
        );

        Ok(stats)
    }

    /// Returns current platform stats, refreshing the cache first
    #[instrument(skip(self))]
    pub async fn get_platform_stats(&self) -> Result<PlatformStats, AppError> {
        self.refresh_platform_stats().await
    }

    /// Builds the leaderboard view: per-user ledger totals, sorted by
    /// amount descending. The sort is stable, so users with equal totals
    /// keep their registration order.
    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, AppError> {
        debug!(limit, "Building leaderboard");

        let users = self.user_repository.list_users().await?;
        let totals = self.donation_repository.totals_by_user().await?;

        let mut entries: Vec<LeaderboardEntry> = users
            .into_iter()
            .map(|user| {
                let ledger = totals.get(&user.id).copied().unwrap_or_default();
                LeaderboardEntry {
                    name: user.name,
                    total_raised: ledger.total_amount,
                    donations_count: ledger.donation_count,
                    level: user.level,
                    achievement_count: user.achievements.len() as i64,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.total_raised.cmp(&a.total_raised));
        entries.truncate(limit);

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donation::models::{DonationKind, DonationModel};
    use crate::donation::repository::InMemoryDonationRepository;
    use crate::progression::Level;
    use crate::stats::repository::InMemoryStatsRepository;
    use crate::user::models::UserModel;
    use crate::user::repository::InMemoryUserRepository;

    struct TestSetup {
        user_repository: Arc<InMemoryUserRepository>,
        donation_repository: Arc<InMemoryDonationRepository>,
        stats_repository: Arc<InMemoryStatsRepository>,
        service: StatsService,
    }

    fn setup() -> TestSetup {
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let donation_repository = Arc::new(InMemoryDonationRepository::new());
        let stats_repository = Arc::new(InMemoryStatsRepository::new());
        let service = StatsService::new(
            user_repository.clone(),
            donation_repository.clone(),
            stats_repository.clone(),
        );

        TestSetup {
            user_repository,
            donation_repository,
            stats_repository,
            service,
        }
    }

    async fn seeded_user(setup: &TestSetup, name: &str, code: &str) -> UserModel {
        let user = UserModel::new(name.to_string(), None, code.to_string());
        setup.user_repository.create_user(&user).await.unwrap();
        user
    }

    async fn seeded_donation(setup: &TestSetup, user_id: &str, amount: i64, days_ago: i64) {
        let donation = DonationModel::new_backdated(
            user_id.to_string(),
            amount,
            "Donor".to_string(),
            DonationKind::Simulated,
            Utc::now() - Duration::days(days_ago),
        );
        setup
            .donation_repository
            .record_donation(&donation)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_platform_yields_zeroed_stats() {
        let setup = setup();

        let stats = setup.service.refresh_platform_stats().await.unwrap();

        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_raised, 0);
        assert_eq!(stats.average_per_user, 0, "no division-by-zero fallback");
        assert_eq!(stats.top_donation, 0);
    }

    #[tokio::test]
    async fn refresh_aggregates_ledger_and_windows() {
        let setup = setup();
        let alice = seeded_user(&setup, "Alice", "AAAAAA").await;
        let bob = seeded_user(&setup, "Bob", "BBBBBB").await;

        seeded_donation(&setup, &alice.id, 300, 1).await;
        seeded_donation(&setup, &alice.id, 500, 10).await;
        seeded_donation(&setup, &bob.id, 200, 40).await;

        let stats = setup.service.refresh_platform_stats().await.unwrap();

        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_raised, 1_000);
        assert_eq!(stats.total_donations, 3);
        assert_eq!(stats.top_donation, 500);
        assert_eq!(stats.average_per_user, 500);
        assert_eq!(stats.this_week, 300);
        assert_eq!(stats.this_month, 800);
    }

    #[tokio::test]
    async fn average_rounds_to_nearest_integer() {
        let setup = setup();
        let alice = seeded_user(&setup, "Alice", "AAAAAA").await;
        seeded_user(&setup, "Bob", "BBBBBB").await;

        seeded_donation(&setup, &alice.id, 501, 1).await;

        let stats = setup.service.refresh_platform_stats().await.unwrap();
        // 501 / 2 = 250.5, rounds away from zero
        assert_eq!(stats.average_per_user, 251);
    }

    #[tokio::test]
    async fn refresh_overwrites_the_cached_row() {
        let setup = setup();
        let alice = seeded_user(&setup, "Alice", "AAAAAA").await;

        setup.service.refresh_platform_stats().await.unwrap();
        seeded_donation(&setup, &alice.id, 750, 0).await;
        setup.service.refresh_platform_stats().await.unwrap();

        let cached = setup.stats_repository.get_stats().await.unwrap().unwrap();
        assert_eq!(cached.total_raised, 750);
        assert_eq!(cached.total_donations, 1);
    }

    #[tokio::test]
    async fn leaderboard_sorts_descending_with_stable_ties() {
        let setup = setup();
        let totals = [("First", 300), ("Second", 500), ("Third", 500), ("Fourth", 100)];
        for (index, (name, amount)) in totals.iter().enumerate() {
            let user = seeded_user(&setup, name, &format!("CODE{:02}", index)).await;
            seeded_donation(&setup, &user.id, *amount, 1).await;
        }

        let leaderboard = setup
            .service
            .get_leaderboard(DEFAULT_LEADERBOARD_LIMIT)
            .await
            .unwrap();

        let names: Vec<&str> = leaderboard.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "Third", "First", "Fourth"]);
    }

    #[tokio::test]
    async fn leaderboard_respects_limit_and_counts_ledger_entries() {
        let setup = setup();
        for index in 0..5 {
            let user = seeded_user(&setup, &format!("User {}", index), &format!("CODE{:02}", index)).await;
            for _ in 0..=index {
                seeded_donation(&setup, &user.id, 100, 1).await;
            }
        }

        let leaderboard = setup.service.get_leaderboard(3).await.unwrap();

        assert_eq!(leaderboard.len(), 3);
        assert_eq!(leaderboard[0].name, "User 4");
        assert_eq!(leaderboard[0].total_raised, 500);
        assert_eq!(leaderboard[0].donations_count, 5);
    }

    #[tokio::test]
    async fn leaderboard_includes_users_without_donations() {
        let setup = setup();
        seeded_user(&setup, "Quiet", "QUIET1").await;

        let leaderboard = setup
            .service
            .get_leaderboard(DEFAULT_LEADERBOARD_LIMIT)
            .await
            .unwrap();

        assert_eq!(leaderboard.len(), 1);
        assert_eq!(leaderboard[0].total_raised, 0);
        assert_eq!(leaderboard[0].level, Level::Beginner);
    }
}
