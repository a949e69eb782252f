// Public API - what other modules can use
pub use models::{LeaderboardEntry, PlatformStats};
pub use repository::{InMemoryStatsRepository, StatsRepository};
pub use service::StatsService;

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
