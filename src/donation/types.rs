use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{DonationKind, DonationModel};
use crate::progression::Achievement;
use crate::user::types::UserResponse;

/// Request payload for recording a donation
///
/// Donor name and kind are optional on the wire; the handler fills in
/// "Anonymous Supporter" and manual respectively.
#[derive(Debug, Deserialize)]
pub struct AddDonationRequest {
    pub user_id: String,
    pub amount: i64,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub message: Option<String>,
    pub kind: Option<DonationKind>,
}

/// Query parameters for the donation history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// A single ledger entry as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct DonationResponse {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub donor_name: String,
    pub message: Option<String>,
    pub date: DateTime<Utc>,
    pub kind: DonationKind,
}

impl From<DonationModel> for DonationResponse {
    fn from(donation: DonationModel) -> Self {
        Self {
            id: donation.id,
            user_id: donation.user_id,
            amount: donation.amount,
            donor_name: donation.donor_name,
            message: donation.message,
            date: donation.date,
            kind: donation.kind,
        }
    }
}

/// Response for a recorded donation: the entry itself, the updated user
/// snapshot, and any badges this donation unlocked
#[derive(Debug, Serialize, Deserialize)]
pub struct AddDonationResponse {
    pub donation: DonationResponse,
    pub user: UserResponse,
    pub new_achievements: Vec<Achievement>,
}
