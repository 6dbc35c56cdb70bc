//! # Storage Traits
//!
//! Storage abstractions used by the domain services. The SQLite backend in
//! [`crate::storage::sqlite`] implements all of them.

use anyhow::Result;
use async_trait::async_trait;

use super::records::{
    ActiveVisitRecord, FacilityUsageRecord, FeedbackRecord, UserRecord, VisitDetailRecord,
    VisitRecord,
};

/// Persistence for registered users
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn store_user(&self, user: &UserRecord) -> Result<()>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// All users ordered by name
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    /// Users whose name contains `fragment`, ignoring ASCII case
    async fn search_users(&self, fragment: &str) -> Result<Vec<UserRecord>>;

    /// Returns false if no such user exists
    async fn update_user(&self, user: &UserRecord) -> Result<bool>;

    /// Returns false if no such user exists. Visits are left in place.
    async fn delete_user(&self, user_id: &str) -> Result<bool>;
}

/// Persistence for visits
#[async_trait]
pub trait VisitStorage: Send + Sync {
    /// Insert an open visit. Returns false if the user already has one open.
    async fn create_visit(&self, visit: &VisitRecord) -> Result<bool>;

    async fn get_visit(&self, visit_id: &str) -> Result<Option<VisitRecord>>;

    async fn get_open_visit_for_user(&self, user_id: &str) -> Result<Option<VisitRecord>>;

    /// Set check-out time and duration together, only if the visit is still open.
    /// Returns false if the visit was missing or already closed.
    async fn close_visit(&self, visit_id: &str, check_out_time: &str, duration: f64) -> Result<bool>;

    /// Open visits of users that still exist, oldest check-in first
    async fn list_open_visits(&self) -> Result<Vec<ActiveVisitRecord>>;

    async fn count_open_visits(&self) -> Result<u64>;

    /// Visits checked in within `[start, end)` (storage timestamps) with their
    /// user, feedback and facility usage, oldest first
    async fn list_visit_details(&self, start: &str, end: &str) -> Result<Vec<VisitDetailRecord>>;
}

/// Persistence for feedback and facility usage
#[async_trait]
pub trait FeedbackStorage: Send + Sync {
    async fn has_feedback(&self, visit_id: &str) -> Result<bool>;

    /// Store the feedback and its facility usage atomically.
    /// Returns false if the visit already has feedback.
    async fn store_feedback(
        &self,
        feedback: &FeedbackRecord,
        usages: &[FacilityUsageRecord],
    ) -> Result<bool>;
}

/// A storage backend that can hand out repositories.
///
/// Services are generic over the connection so tests and alternative
/// backends can supply their own repositories.
pub trait Connection: Send + Sync + Clone {
    type UserRepository: UserStorage + Clone;
    type VisitRepository: VisitStorage + Clone;
    type FeedbackRepository: FeedbackStorage + Clone;

    fn create_user_repository(&self) -> Self::UserRepository;

    fn create_visit_repository(&self) -> Self::VisitRepository;

    fn create_feedback_repository(&self) -> Self::FeedbackRepository;
}
