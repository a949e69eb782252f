// Library crate for the donation tracking server
// This file exposes the public API for integration tests

pub mod demo;
pub mod donation;
pub mod progression;
pub mod shared;
pub mod stats;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use donation::{DonationKind, DonationModel, DonationRepository, DonationService};
pub use progression::{Achievement, AchievementTier, Level};
pub use shared::{AppError, AppState};
pub use stats::{LeaderboardEntry, PlatformStats, StatsRepository, StatsService};
pub use user::{UserModel, UserRepository, UserService};
