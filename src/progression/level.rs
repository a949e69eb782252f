use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Amount required to reach the Contributor level
pub const CONTRIBUTOR_THRESHOLD: i64 = 1_000;
/// Amount required to reach the Rising Star level
pub const RISING_STAR_THRESHOLD: i64 = 5_000;
/// Amount required to reach the Master level
pub const MASTER_THRESHOLD: i64 = 10_000;

/// Named progression tier derived from a user's cumulative amount raised
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
pub enum Level {
    Beginner,
    Contributor,
    #[serde(rename = "Rising Star")]
    #[strum(serialize = "Rising Star")]
    RisingStar,
    Master,
}

impl Level {
    /// Maps a cumulative amount raised to its tier.
    ///
    /// Thresholds are evaluated highest-first with inclusive lower bounds.
    /// Negative amounts fall through to Beginner.
    pub fn for_amount(total_raised: i64) -> Self {
        if total_raised >= MASTER_THRESHOLD {
            Level::Master
        } else if total_raised >= RISING_STAR_THRESHOLD {
            Level::RisingStar
        } else if total_raised >= CONTRIBUTOR_THRESHOLD {
            Level::Contributor
        } else {
            Level::Beginner
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Beginner
    }
}
