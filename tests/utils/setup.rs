use std::sync::Arc;

use fundstreak::donation::repository::InMemoryDonationRepository;
use fundstreak::donation::service::NewDonation;
use fundstreak::donation::{DonationKind, DonationService};
use fundstreak::shared::AppState;
use fundstreak::stats::repository::InMemoryStatsRepository;
use fundstreak::user::repository::InMemoryUserRepository;
use fundstreak::UserModel;

/// Everything a workflow test needs: the shared state plus direct handles
/// on the concrete in-memory repositories for assertions.
pub struct TestSetup {
    pub state: AppState,
    pub user_repository: Arc<InMemoryUserRepository>,
    pub donation_repository: Arc<InMemoryDonationRepository>,
    pub stats_repository: Arc<InMemoryStatsRepository>,
}

impl TestSetup {
    pub fn new() -> Self {
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let donation_repository = Arc::new(InMemoryDonationRepository::new());
        let stats_repository = Arc::new(InMemoryStatsRepository::new());

        let state = AppState::new(
            user_repository.clone(),
            donation_repository.clone(),
            stats_repository.clone(),
        );

        Self {
            state,
            user_repository,
            donation_repository,
            stats_repository,
        }
    }

    pub fn donation_service(&self) -> &DonationService {
        &self.state.donation_service
    }

    pub async fn create_user(&self, name: &str) -> UserModel {
        self.state
            .user_service
            .create_user(name.to_string(), None)
            .await
            .expect("user creation should succeed")
    }

    pub async fn donate(&self, user_id: &str, amount: i64) -> fundstreak::donation::DonationOutcome {
        self.donation_service()
            .add_donation(NewDonation {
                user_id: user_id.to_string(),
                amount,
                donor_name: "Test Donor".to_string(),
                donor_email: None,
                message: None,
                kind: DonationKind::Manual,
            })
            .await
            .expect("donation should succeed")
    }
}

impl Default for TestSetup {
    fn default() -> Self {
        Self::new()
    }
}
