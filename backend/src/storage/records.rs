//! Row shapes exchanged with the storage layer.
//!
//! Dates and instants stay as the text stored in the database; the domain
//! models parse them. Instants are written as UTC RFC 3339 with millisecond
//! precision so that text ordering matches time ordering.

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub birthdate: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub emergency_contact: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub id: String,
    pub user_id: String,
    pub check_in_time: String,
    pub check_out_time: Option<String>,
    pub duration: Option<f64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub id: String,
    pub visit_id: String,
    pub rating: i64,
    pub comments: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacilityUsageRecord {
    pub id: String,
    pub visit_id: String,
    pub facility_name: String,
    pub created_at: String,
}

/// An open visit joined with its visitor's name.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVisitRecord {
    pub visit: VisitRecord,
    pub user_name: String,
}

/// A visit with everything the dashboard shows about it. `user` is `None`
/// when the visitor has since been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitDetailRecord {
    pub visit: VisitRecord,
    pub user: Option<UserRecord>,
    pub feedback: Option<FeedbackRecord>,
    pub facilities: Vec<String>,
}
