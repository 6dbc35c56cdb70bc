//! # SQLite Storage
//!
//! sqlx-backed implementations of the storage traits.
//!
//! - **connection.rs** - pool management, schema setup and table health checks
//! - **user_repository.rs** - registered users
//! - **visit_repository.rs** - visits, active visitors and report queries
//! - **feedback_repository.rs** - feedback and facility usage

pub mod connection;
pub mod feedback_repository;
pub mod user_repository;
pub mod visit_repository;

pub use connection::{DbConnection, TableCheck, TABLES};
pub use feedback_repository::FeedbackRepository;
pub use user_repository::UserRepository;
pub use visit_repository::VisitRepository;
