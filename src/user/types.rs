use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::UserModel;
use crate::donation::types::DonationResponse;
use crate::progression::{Achievement, Level};

/// Request payload for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: Option<String>,
}

/// Request payload for updating a fundraising goal
#[derive(Debug, Deserialize)]
pub struct GoalUpdateRequest {
    pub goal: i64,
}

/// A user as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub referral_code: String,
    pub total_raised: i64,
    pub donations_count: i32,
    pub current_goal: i64,
    pub level: Level,
    pub streak: i32,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub achievements: Vec<Achievement>,
    pub join_date: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            referral_code: user.referral_code,
            total_raised: user.total_raised,
            donations_count: user.donations_count,
            current_goal: user.current_goal,
            level: user.level,
            streak: user.streak,
            last_donation_date: user.last_donation_date,
            achievements: user.achievements,
            join_date: user.join_date,
        }
    }
}

/// Response for the profile endpoint: the reconciled user plus their
/// most recent donations
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub user: UserResponse,
    pub recent_donations: Vec<DonationResponse>,
}
