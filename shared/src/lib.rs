use serde::{Deserialize, Serialize};

/// A registered makerspace user as returned by the API.
///
/// `age` is derived from `birthdate` at request time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Birthdate in `YYYY-MM-DD` format
    pub birthdate: String,
    /// Whole years as of the site's current date
    pub age: i32,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub emergency_contact: Option<String>,
    pub photo_url: Option<String>,
    /// Registration timestamp (RFC 3339, UTC)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    /// Birthdate in `YYYY-MM-DD` format
    pub birthdate: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Editable user fields. The birthdate cannot be changed after registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_contact: Option<String>,
    pub emergency_contact: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// A search hit, flagged with whether the user is currently inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResult {
    pub user: User,
    pub is_checked_in: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearchResponse {
    pub query: String,
    pub results: Vec<UserSearchResult>,
}

/// A visit record. `check_out_time` and `duration` are either both set or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: String,
    pub user_id: String,
    /// Check-in instant (RFC 3339, site offset)
    pub check_in_time: String,
    /// Check-out instant (RFC 3339, site offset)
    pub check_out_time: Option<String>,
    /// Visit length in hours
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub visit: Visit,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutResponse {
    pub visit: Visit,
    /// Duration formatted for display, e.g. `"2.50 hrs"`
    pub formatted_duration: String,
    pub success_message: String,
}

/// An open visit together with the visitor it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveVisit {
    pub visit_id: String,
    pub user_id: String,
    pub user_name: String,
    pub check_in_time: String,
    /// Check-in time in site time, `%I:%M %p`
    pub formatted_check_in: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveVisitsResponse {
    pub visits: Vec<ActiveVisit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitFeedbackRequest {
    /// Rating from 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub facilities_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub visit_id: String,
    pub rating: u8,
    pub comments: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitFeedbackResponse {
    pub feedback: Feedback,
    pub facilities_recorded: Vec<String>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityListResponse {
    pub facilities: Vec<String>,
}

/// Query parameters for the dashboard and CSV export (dates as `YYYY-MM-DD`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// One row of the visit records table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitReportRow {
    pub visit_id: String,
    pub date: String,
    pub name: String,
    pub age: Option<i32>,
    pub guardian: String,
    pub guardian_contact: String,
    pub check_in: String,
    pub check_out: String,
    pub duration_hours: Option<f64>,
    pub facilities_used: String,
    pub rating: Option<u8>,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_visits: usize,
    pub average_duration_hours: Option<f64>,
    pub average_rating: Option<f64>,
    pub active_visits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVisitCount {
    pub date: String,
    pub visits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityUsageCount {
    pub facility: String,
    pub times_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub start_date: String,
    pub end_date: String,
    pub metrics: SummaryMetrics,
    pub rows: Vec<VisitReportRow>,
    pub daily_visits: Vec<DailyVisitCount>,
    pub facility_usage: Vec<FacilityUsageCount>,
    /// Visits left out because their stored data could not be read
    pub skipped_visits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickStats {
    pub active_users: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteClockResponse {
    /// Current site time (RFC 3339)
    pub now: String,
    /// e.g. `"January 05, 2025 09:30 AM"`
    pub display: String,
    /// `YYYY-MM-DD`
    pub today: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table: String,
    pub accessible: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub tables: Vec<TableStatus>,
}
