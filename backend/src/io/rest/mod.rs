//! # REST API Interface Layer
//!
//! HTTP endpoints for the check-in service, all mounted under `/api`.
//! Handlers translate JSON requests into domain commands, call the services
//! on [`crate::AppState`], and map results and [`crate::domain::DomainError`]s
//! back into responses.

pub mod error;
pub mod feedback_apis;
pub mod mappers;
pub mod report_apis;
pub mod system_apis;
pub mod user_apis;
pub mod visit_apis;

pub use error::ApiError;
pub use feedback_apis::*;
pub use report_apis::*;
pub use system_apis::*;
pub use user_apis::*;
pub use visit_apis::*;
