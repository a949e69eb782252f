// Pure progression rules: no I/O, no clocks of their own.
// Services pass in the current time so these stay trivially testable.

pub mod achievements;
pub mod level;
pub mod streak;

pub use achievements::{newly_earned, Achievement, AchievementTier, ProgressSnapshot};
pub use level::Level;
pub use streak::{advance_streak, StreakUpdate};
