use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{info, instrument};

use super::models::{DonationKind, DonationModel, MAX_MESSAGE_LENGTH};
use super::repository::DonationRepository;
use crate::progression::{advance_streak, newly_earned, Achievement, Level};
use crate::shared::AppError;
use crate::stats::service::StatsService;
use crate::user::models::UserModel;
use crate::user::repository::UserRepository;

/// Input for recording a donation
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub user_id: String,
    pub amount: i64,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub message: Option<String>,
    pub kind: DonationKind,
}

/// Everything a single donation changed
#[derive(Debug, Clone)]
pub struct DonationOutcome {
    pub donation: DonationModel,
    pub user: UserModel,
    pub new_achievements: Vec<Achievement>,
}

/// Service orchestrating the donation ledger and user progression
///
/// A donation is a read-modify-write on the owning user (totals, streak,
/// level, achievements), so writes to the same user are serialized behind
/// a per-user async mutex. Writes to distinct users run in parallel.
pub struct DonationService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    donation_repository: Arc<dyn DonationRepository + Send + Sync>,
    stats_service: Arc<StatsService>,
    user_locks: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl DonationService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        donation_repository: Arc<dyn DonationRepository + Send + Sync>,
        stats_service: Arc<StatsService>,
    ) -> Self {
        Self {
            user_repository,
            donation_repository,
            stats_service,
            user_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Records a donation and applies the progression rules to its user.
    ///
    /// Streak and level are recomputed before achievements are evaluated,
    /// since the achievement triggers key off the post-update figures.
    /// The platform stats cache is refreshed before returning.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, amount = request.amount))]
    pub async fn add_donation(&self, request: NewDonation) -> Result<DonationOutcome, AppError> {
        let user_lock = self.user_lock(&request.user_id).await;
        let _guard = user_lock.lock().await;

        let mut user = self
            .user_repository
            .get_user(&request.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Self::validate(&request)?;

        let donation = DonationModel::new(
            request.user_id.clone(),
            request.amount,
            request.donor_name,
            request.donor_email,
            request.message,
            request.kind,
        );
        let now = donation.date;

        self.donation_repository.record_donation(&donation).await?;

        user.total_raised += donation.amount;
        user.donations_count += 1;

        let streak_update = advance_streak(user.streak, user.last_donation_date, now);
        user.streak = streak_update.streak;
        user.last_donation_date = Some(streak_update.last_donation_date);
        user.level = Level::for_amount(user.total_raised);

        let new_achievements = newly_earned(&user.progress_snapshot(), &user.achievements, now);
        user.achievements.extend(new_achievements.iter().cloned());

        self.user_repository.update_user(&user).await?;

        info!(
            donation_id = %donation.id,
            user_id = %user.id,
            total_raised = user.total_raised,
            streak = user.streak,
            new_achievements = new_achievements.len(),
            "Donation recorded"
        );

        // Stats refresh is synchronous so callers can rely on fresh
        // aggregates, but its failure does not undo the donation.
        self.stats_service.refresh_platform_stats().await?;

        Ok(DonationOutcome {
            donation,
            user,
            new_achievements,
        })
    }

    /// Returns a user's donation history, newest first
    #[instrument(skip(self))]
    pub async fn donation_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DonationModel>, AppError> {
        if self.user_repository.get_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.donation_repository.donations_for_user(user_id, limit).await
    }

    fn validate(request: &NewDonation) -> Result<(), AppError> {
        if request.amount < 1 {
            return Err(AppError::Validation(
                "Donation amount must be at least 1".to_string(),
            ));
        }

        if let Some(message) = &request.message {
            if message.chars().count() > MAX_MESSAGE_LENGTH {
                return Err(AppError::Validation(format!(
                    "Message exceeds {} characters",
                    MAX_MESSAGE_LENGTH
                )));
            }
        }

        Ok(())
    }

    async fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.user_locks.read().await;
            if let Some(lock) = guard.get(user_id) {
                return lock.clone();
            }
        }

        let mut guard = self.user_locks.write().await;
        guard
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
