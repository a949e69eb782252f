use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{DonationKind, DonationModel, LedgerAggregate, LedgerTotals};
use crate::shared::AppError;

/// Trait for donation ledger operations
///
/// The ledger is append-only: there are no update or delete operations.
/// Aggregation queries live here so each backend can answer them natively
/// (SQL aggregates in Postgres, folds in memory).
#[async_trait]
pub trait DonationRepository {
    async fn record_donation(&self, donation: &DonationModel) -> Result<(), AppError>;

    /// Returns a user's donations, newest first, truncated to `limit`
    async fn donations_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DonationModel>, AppError>;

    /// Sums one user's ledger entries
    async fn user_totals(&self, user_id: &str) -> Result<LedgerTotals, AppError>;

    /// Sums ledger entries grouped by user, for the leaderboard join
    async fn totals_by_user(&self) -> Result<HashMap<String, LedgerTotals>, AppError>;

    /// Whole-ledger totals: sum, count and largest single donation
    async fn aggregate(&self) -> Result<LedgerAggregate, AppError>;

    /// Sum of amounts donated at or after `cutoff`
    async fn sum_since(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError>;
}

/// In-memory implementation of DonationRepository for development and testing
///
/// The ledger is a plain vector in append order; data is lost when the
/// application restarts.
pub struct InMemoryDonationRepository {
    donations: Mutex<Vec<DonationModel>>,
}

impl Default for InMemoryDonationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDonationRepository {
    /// Creates a new empty in-memory ledger
    pub fn new() -> Self {
        Self {
            donations: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current number of ledger entries
    pub fn donation_count(&self) -> usize {
        self.donations.lock().unwrap().len()
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonationRepository {
    #[instrument(skip(self, donation))]
    async fn record_donation(&self, donation: &DonationModel) -> Result<(), AppError> {
        debug!(
            donation_id = %donation.id,
            user_id = %donation.user_id,
            amount = donation.amount,
            "Recording donation in memory"
        );

        let mut donations = self.donations.lock().unwrap();
        donations.push(donation.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn donations_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DonationModel>, AppError> {
        debug!(user_id = %user_id, limit, "Fetching donation history from memory");

        let donations = self.donations.lock().unwrap();
        let mut history: Vec<DonationModel> = donations
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history.truncate(limit);

        Ok(history)
    }

    #[instrument(skip(self))]
    async fn user_totals(&self, user_id: &str) -> Result<LedgerTotals, AppError> {
        let donations = self.donations.lock().unwrap();
        let totals = donations
            .iter()
            .filter(|d| d.user_id == user_id)
            .fold(LedgerTotals::default(), |acc, d| LedgerTotals {
                total_amount: acc.total_amount + d.amount,
                donation_count: acc.donation_count + 1,
            });

        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn totals_by_user(&self) -> Result<HashMap<String, LedgerTotals>, AppError> {
        let donations = self.donations.lock().unwrap();
        let mut totals: HashMap<String, LedgerTotals> = HashMap::new();
        for donation in donations.iter() {
            let entry = totals.entry(donation.user_id.clone()).or_default();
            entry.total_amount += donation.amount;
            entry.donation_count += 1;
        }

        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn aggregate(&self) -> Result<LedgerAggregate, AppError> {
        let donations = self.donations.lock().unwrap();
        let aggregate = donations
            .iter()
            .fold(LedgerAggregate::default(), |acc, d| LedgerAggregate {
                total_raised: acc.total_raised + d.amount,
                total_donations: acc.total_donations + 1,
                top_donation: acc.top_donation.max(d.amount),
            });

        Ok(aggregate)
    }

    #[instrument(skip(self))]
    async fn sum_since(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        let donations = self.donations.lock().unwrap();
        let sum = donations
            .iter()
            .filter(|d| d.date >= cutoff)
            .map(|d| d.amount)
            .sum();

        Ok(sum)
    }
}

/// PostgreSQL implementation of the donation ledger
pub struct PostgresDonationRepository {
    pool: PgPool,
}

impl PostgresDonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_donation(row: &sqlx::postgres::PgRow) -> Result<DonationModel, AppError> {
        let kind: String = row.get("kind");
        let kind = kind
            .parse::<DonationKind>()
            .map_err(|e| AppError::DatabaseError(format!("Invalid donation kind: {}", e)))?;

        Ok(DonationModel {
            id: row.get("id"),
            user_id: row.get("user_id"),
            amount: row.get("amount"),
            donor_name: row.get("donor_name"),
            donor_email: row.get("donor_email"),
            message: row.get("message"),
            date: row.get("date"),
            kind,
        })
    }
}

#[async_trait]
impl DonationRepository for PostgresDonationRepository {
    #[instrument(skip(self, donation))]
    async fn record_donation(&self, donation: &DonationModel) -> Result<(), AppError> {
        debug!(
            donation_id = %donation.id,
            user_id = %donation.user_id,
            amount = donation.amount,
            "Recording donation in database"
        );

        sqlx::query(
            "INSERT INTO donations (id, user_id, amount, donor_name, donor_email, message, date, kind) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&donation.id)
        .bind(&donation.user_id)
        .bind(donation.amount)
        .bind(&donation.donor_name)
        .bind(&donation.donor_email)
        .bind(&donation.message)
        .bind(donation.date)
        .bind(donation.kind.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to record donation in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(donation_id = %donation.id, "Donation recorded successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn donations_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<DonationModel>, AppError> {
        debug!(user_id = %user_id, limit, "Fetching donation history from database");

        let rows = sqlx::query(
            "SELECT * FROM donations WHERE user_id = $1 ORDER BY date DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch donation history");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::row_to_donation).collect()
    }

    #[instrument(skip(self))]
    async fn user_totals(&self, user_id: &str) -> Result<LedgerTotals, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT AS total_amount, COUNT(*)::INT AS donation_count \
             FROM donations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to sum user ledger");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(LedgerTotals {
            total_amount: row.get("total_amount"),
            donation_count: row.get("donation_count"),
        })
    }

    #[instrument(skip(self))]
    async fn totals_by_user(&self) -> Result<HashMap<String, LedgerTotals>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, COALESCE(SUM(amount), 0)::BIGINT AS total_amount, COUNT(*)::INT AS donation_count \
             FROM donations GROUP BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to group ledger totals by user");
            AppError::DatabaseError(e.to_string())
        })?;

        let totals = rows
            .into_iter()
            .map(|row| {
                (
                    row.get("user_id"),
                    LedgerTotals {
                        total_amount: row.get("total_amount"),
                        donation_count: row.get("donation_count"),
                    },
                )
            })
            .collect();

        Ok(totals)
    }

    #[instrument(skip(self))]
    async fn aggregate(&self) -> Result<LedgerAggregate, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT AS total_raised, COUNT(*) AS total_donations, \
             COALESCE(MAX(amount), 0) AS top_donation FROM donations",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to aggregate donation ledger");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(LedgerAggregate {
            total_raised: row.get("total_raised"),
            total_donations: row.get("total_donations"),
            top_donation: row.get("top_donation"),
        })
    }

    #[instrument(skip(self))]
    async fn sum_since(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT AS window_sum FROM donations WHERE date >= $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to sum donation window");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.get("window_sum"))
    }
}
