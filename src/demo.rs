use chrono::{Duration, Utc};
use tracing::{info, instrument};

use crate::donation::models::{DonationKind, DonationModel};
use crate::donation::repository::DonationRepository;
use crate::shared::{AppError, AppState};
use crate::user::repository::UserRepository;

/// Display names for the seeded demo users
const SAMPLE_USERS: &[&str] = &[
    "Alex Johnson",
    "Sarah Chen",
    "Mike Rodriguez",
    "Emma Davis",
    "John Smith",
];

/// Populates an empty store with sample users and simulated donations.
///
/// Skipped entirely when users already exist, so restarting against a
/// persistent store never duplicates data. Donations are backdated over
/// the trailing 30 days to give the weekly and monthly windows something
/// to show.
#[instrument(skip(state))]
pub async fn seed_demo_data(state: &AppState) -> Result<(), AppError> {
    if state.user_repository.count_users().await? > 0 {
        info!("Store already has data, skipping demo seed");
        return Ok(());
    }

    info!("Seeding store with demo data");

    for name in SAMPLE_USERS {
        let user = state
            .user_service
            .create_user(name.to_string(), None)
            .await?;

        let donation_count = rand::random_range(3..8);
        for index in 0..donation_count {
            let amount = rand::random_range(50..250);
            let minutes_ago = rand::random_range(0..(30 * 24 * 60));
            let donation = DonationModel::new_backdated(
                user.id.clone(),
                amount,
                format!("Donor {}", index + 1),
                DonationKind::Simulated,
                Utc::now() - Duration::minutes(minutes_ago),
            );
            state.donation_repository.record_donation(&donation).await?;
        }

        // Seeded entries bypass the ledger updater, so pull the user's
        // totals and level back in line with the ledger.
        state.user_service.get_user_with_stats(&user.id).await?;
    }

    state.stats_service.refresh_platform_stats().await?;

    info!(user_count = SAMPLE_USERS.len(), "Demo data seeded");
    Ok(())
}
