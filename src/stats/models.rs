use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::Level;

/// Cached platform-wide aggregates
///
/// A materialized view over the users and donations collections: a single
/// row, fully recomputed and overwritten on every refresh. The ledger is
/// the source of truth, never this cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_raised: i64,
    pub total_donations: i64,
    pub average_per_user: i64,
    pub top_donation: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub last_updated: DateTime<Utc>,
}

impl PlatformStats {
    /// The documented default when no data exists yet
    pub fn zeroed(now: DateTime<Utc>) -> Self {
        Self {
            total_users: 0,
            total_raised: 0,
            total_donations: 0,
            average_per_user: 0,
            top_donation: 0,
            this_week: 0,
            this_month: 0,
            last_updated: now,
        }
    }
}

/// One row of the leaderboard view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub total_raised: i64,
    pub donations_count: i32,
    pub level: Level,
    pub achievement_count: i64,
}
