use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Longest donor message accepted on a donation
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Origin of a donation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DonationKind {
    Manual,
    Simulated,
    Real,
}

impl Default for DonationKind {
    fn default() -> Self {
        DonationKind::Manual
    }
}

/// Database model for the donations collection
///
/// Records are immutable once created; the ledger is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationModel {
    pub id: String, // UUID v4 as string
    pub user_id: String,
    pub amount: i64, // minimum 1
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub message: Option<String>,
    pub date: DateTime<Utc>,
    pub kind: DonationKind,
}

impl DonationModel {
    /// Creates a donation stamped with the current time
    pub fn new(
        user_id: String,
        amount: i64,
        donor_name: String,
        donor_email: Option<String>,
        message: Option<String>,
        kind: DonationKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            amount,
            donor_name,
            donor_email,
            message,
            date: Utc::now(),
            kind,
        }
    }

    /// Creates a donation with an explicit date, used when seeding demo data
    pub fn new_backdated(
        user_id: String,
        amount: i64,
        donor_name: String,
        kind: DonationKind,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            amount,
            donor_name,
            donor_email: None,
            message: None,
            date,
            kind,
        }
    }
}

/// Per-user sums joined from the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_amount: i64,
    pub donation_count: i32,
}

/// Whole-ledger aggregate used by the platform stats refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerAggregate {
    pub total_raised: i64,
    pub total_donations: i64,
    pub top_donation: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_donation_gets_id_and_timestamp() {
        let donation = DonationModel::new(
            "user-1".to_string(),
            150,
            "Anonymous".to_string(),
            None,
            None,
            DonationKind::Manual,
        );

        assert!(!donation.id.is_empty());
        assert_eq!(donation.amount, 150);
        assert_eq!(donation.kind, DonationKind::Manual);
    }

    #[test]
    fn kind_round_trips_through_text() {
        assert_eq!(DonationKind::Simulated.to_string(), "simulated");
        assert_eq!(
            "real".parse::<DonationKind>().unwrap(),
            DonationKind::Real
        );
    }

    #[test]
    fn kind_defaults_to_manual() {
        assert_eq!(DonationKind::default(), DonationKind::Manual);
    }
}
