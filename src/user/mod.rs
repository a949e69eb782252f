// Public API - what other modules can use
pub use models::UserModel;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
