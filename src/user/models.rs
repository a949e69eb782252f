use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::{Achievement, Level, ProgressSnapshot};

/// Goal assigned to a user who has not picked one yet
pub const DEFAULT_GOAL: i64 = 1_000;

/// Database model for the users collection
///
/// Derived fields (total_raised, donations_count, level, streak,
/// achievements) are owned by the services; nothing else mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserModel {
    pub id: String, // UUID v4 as string
    pub name: String,
    pub email: Option<String>,
    pub referral_code: String, // 6 uppercase alphanumeric chars, unique
    pub total_raised: i64,
    pub donations_count: i32,
    pub current_goal: i64,
    pub level: Level,
    pub streak: i32,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub achievements: Vec<Achievement>,
    pub join_date: DateTime<Utc>,
}

impl UserModel {
    /// Creates a fresh user with generated ID and default progression state
    pub fn new(name: String, email: Option<String>, referral_code: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            referral_code,
            total_raised: 0,
            donations_count: 0,
            current_goal: DEFAULT_GOAL,
            level: Level::Beginner,
            streak: 0,
            last_donation_date: None,
            achievements: Vec::new(),
            join_date: Utc::now(),
        }
    }

    /// Checks whether a badge with this name has already been earned
    pub fn has_achievement(&self, name: &str) -> bool {
        self.achievements.iter().any(|a| a.name == name)
    }

    /// The cumulative figures achievement triggers evaluate against
    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_raised: self.total_raised,
            streak: self.streak,
            donations_count: self.donations_count,
        }
    }
}
