use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Badge tier awarded with an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AchievementTier {
    Bronze,
    Silver,
    Gold,
}

/// A one-time badge earned when a threshold is first crossed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    pub tier: AchievementTier,
    pub earned_at: DateTime<Utc>,
}

/// The cumulative figures an achievement trigger can key off
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub total_raised: i64,
    pub streak: i32,
    pub donations_count: i32,
}

struct AchievementRule {
    name: &'static str,
    tier: AchievementTier,
    trigger: fn(&ProgressSnapshot) -> bool,
}

/// Rule table, checked in order. Output order follows this table.
static RULES: &[AchievementRule] = &[
    AchievementRule {
        name: "First 500",
        tier: AchievementTier::Bronze,
        trigger: |s| s.total_raised >= 500,
    },
    AchievementRule {
        name: "Rising Star",
        tier: AchievementTier::Silver,
        trigger: |s| s.total_raised >= 1_000,
    },
    AchievementRule {
        name: "Champion",
        tier: AchievementTier::Gold,
        trigger: |s| s.total_raised >= 5_000,
    },
    AchievementRule {
        name: "Week Warrior",
        tier: AchievementTier::Silver,
        trigger: |s| s.streak >= 7,
    },
    AchievementRule {
        name: "Consistent Giver",
        tier: AchievementTier::Bronze,
        trigger: |s| s.donations_count >= 10,
    },
];

/// Evaluates the rule table against a user's post-update figures and
/// returns the badges newly crossed this evaluation.
///
/// A name already present in `existing` is never emitted again, so the
/// caller can append the result to the user's permanent list without
/// checking for duplicates.
pub fn newly_earned(
    snapshot: &ProgressSnapshot,
    existing: &[Achievement],
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    RULES
        .iter()
        .filter(|rule| (rule.trigger)(snapshot))
        .filter(|rule| !existing.iter().any(|earned| earned.name == rule.name))
        .map(|rule| Achievement {
            name: rule.name.to_string(),
            tier: rule.tier,
            earned_at: now,
        })
        .collect()
}
