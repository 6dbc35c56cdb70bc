//! # Domain Module
//!
//! Business logic for the makerspace check-in service.
//!
//! ## Module Organization
//!
//! - **calculations**: age and visit duration, the two pure calculators
//! - **clock**: the site's fixed-offset clock and display formats
//! - **models**: users, visits, feedback and the facility catalogue
//! - **commands**: inputs and results exchanged with the REST layer
//! - **user_service**: registration, search and maintenance of users
//! - **visit_service**: check-in, check-out and the active visitor list
//! - **feedback_service**: post-visit ratings and facility usage
//! - **report_service** / **export_service**: the admin dashboard and its CSV
//!
//! ## Business Rules
//!
//! - Age is derived from the birthdate on every read and never stored
//! - A user has at most one open visit
//! - A visit is closed exactly once; check-out time and duration are set together
//! - Feedback is given once per visit, after check-out
//! - Visits outlive the users they belong to

pub mod calculations;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod feedback_service;
pub mod models;
pub mod report_service;
pub mod user_service;
pub mod visit_service;

pub use calculations::{calculate_age, calculate_duration_hours};
pub use clock::SiteClock;
pub use errors::{DomainError, DomainResult};
pub use export_service::ExportService;
pub use feedback_service::FeedbackService;
pub use report_service::ReportService;
pub use user_service::UserService;
pub use visit_service::VisitService;
