// Public API - what other modules can use
pub use models::{DonationKind, DonationModel, LedgerAggregate, LedgerTotals};
pub use repository::{DonationRepository, InMemoryDonationRepository};
pub use service::{DonationOutcome, DonationService};

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
