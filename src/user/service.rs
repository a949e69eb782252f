use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, instrument};

use super::models::UserModel;
use super::repository::UserRepository;
use crate::donation::models::DonationModel;
use crate::donation::repository::DonationRepository;
use crate::progression::Level;
use crate::shared::AppError;

/// Donations returned alongside a user profile
const PROFILE_HISTORY_LIMIT: usize = 10;

const REFERRAL_CODE_LENGTH: usize = 6;
const REFERRAL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A user together with their most recent donations
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: UserModel,
    pub recent_donations: Vec<DonationModel>,
}

/// Service for user lifecycle and profile reads
pub struct UserService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    donation_repository: Arc<dyn DonationRepository + Send + Sync>,
}

impl UserService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        donation_repository: Arc<dyn DonationRepository + Send + Sync>,
    ) -> Self {
        Self {
            user_repository,
            donation_repository,
        }
    }

    /// Creates a user with defaults and a unique referral code
    #[instrument(skip(self))]
    pub async fn create_user(
        &self,
        name: String,
        email: Option<String>,
    ) -> Result<UserModel, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }

        let referral_code = self.generate_referral_code().await?;
        let user = UserModel::new(name.trim().to_string(), email, referral_code);
        self.user_repository.create_user(&user).await?;

        info!(user_id = %user.id, name = %user.name, referral_code = %user.referral_code, "User created");
        Ok(user)
    }

    /// Returns a user's profile with their derived totals reconciled
    /// against the ledger.
    ///
    /// The stored totals are a running cache; the ledger is the source of
    /// truth. This read recomputes total_raised, donations_count and level
    /// from the ledger, persists any correction, and returns the user's
    /// most recent donations alongside.
    #[instrument(skip(self))]
    pub async fn get_user_with_stats(&self, user_id: &str) -> Result<UserProfile, AppError> {
        let mut user = self
            .user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let ledger = self.donation_repository.user_totals(user_id).await?;
        user.total_raised = ledger.total_amount;
        user.donations_count = ledger.donation_count;
        user.level = Level::for_amount(user.total_raised);

        self.user_repository.update_user(&user).await?;

        let recent_donations = self
            .donation_repository
            .donations_for_user(user_id, PROFILE_HISTORY_LIMIT)
            .await?;

        debug!(
            user_id = %user.id,
            total_raised = user.total_raised,
            donations_count = user.donations_count,
            "User profile reconciled against ledger"
        );

        Ok(UserProfile {
            user,
            recent_donations,
        })
    }

    /// Updates a user's fundraising goal
    #[instrument(skip(self))]
    pub async fn set_goal(&self, user_id: &str, new_goal: i64) -> Result<UserModel, AppError> {
        if new_goal < 1 {
            return Err(AppError::Validation(
                "Goal must be at least 1".to_string(),
            ));
        }

        let mut user = self
            .user_repository
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        user.current_goal = new_goal;
        self.user_repository.update_user(&user).await?;

        info!(user_id = %user.id, new_goal, "Goal updated");
        Ok(user)
    }

    /// Picks a referral code not already taken by another user
    async fn generate_referral_code(&self) -> Result<String, AppError> {
        loop {
            let code = random_referral_code();
            if self
                .user_repository
                .find_by_referral_code(&code)
                .await?
                .is_none()
            {
                return Ok(code);
            }
        }
    }
}

fn random_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| REFERRAL_CHARSET[rng.random_range(0..REFERRAL_CHARSET.len())] as char)
        .collect()
}
