//! Conversions between the public DTOs in `shared` and domain types.

pub mod feedback_mapper;
pub mod report_mapper;
pub mod user_mapper;
pub mod visit_mapper;

pub use feedback_mapper::FeedbackMapper;
pub use report_mapper::ReportMapper;
pub use user_mapper::UserMapper;
pub use visit_mapper::VisitMapper;
