use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};

use super::service::NewDonation;
use super::types::{AddDonationRequest, AddDonationResponse, DonationResponse, HistoryQuery};
use crate::shared::{AppError, AppState};

/// History entries returned when the caller does not ask for more
const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Donor name used when none is supplied
const ANONYMOUS_DONOR: &str = "Anonymous Supporter";

/// HTTP handler for recording a donation
///
/// POST /api/donations/add
/// Returns the donation, the updated user and any newly earned badges
#[instrument(name = "add_donation", skip(state, request))]
pub async fn add_donation(
    State(state): State<AppState>,
    Json(request): Json<AddDonationRequest>,
) -> Result<Json<AddDonationResponse>, AppError> {
    info!(user_id = %request.user_id, amount = request.amount, "Recording donation");

    let outcome = state
        .donation_service
        .add_donation(NewDonation {
            user_id: request.user_id,
            amount: request.amount,
            donor_name: request
                .donor_name
                .unwrap_or_else(|| ANONYMOUS_DONOR.to_string()),
            donor_email: request.donor_email,
            message: request.message,
            kind: request.kind.unwrap_or_default(),
        })
        .await?;

    Ok(Json(AddDonationResponse {
        donation: outcome.donation.into(),
        user: outcome.user.into(),
        new_achievements: outcome.new_achievements,
    }))
}

/// HTTP handler for a user's donation history
///
/// GET /api/donations/:user_id/history?limit=20
/// Returns ledger entries newest first
#[instrument(name = "donation_history", skip(state))]
pub async fn donation_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DonationResponse>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = state
        .donation_service
        .donation_history(&user_id, limit)
        .await?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}
