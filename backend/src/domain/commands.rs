//! Domain-level command and query types.
//!
//! Services take and return these; the REST layer maps the public DTOs from
//! the `shared` crate onto them.

pub mod user {
    use crate::domain::models::User;

    /// Input for registering a new user.
    #[derive(Debug, Clone)]
    pub struct RegisterUserCommand {
        pub name: String,
        /// `YYYY-MM-DD`
        pub birthdate: String,
        pub guardian_name: String,
        pub guardian_contact: String,
        pub emergency_contact: Option<String>,
        pub photo_url: Option<String>,
    }

    /// Fields to change on an existing user. `None` leaves a field as is;
    /// a blank optional contact or photo clears it.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateUserCommand {
        pub name: Option<String>,
        pub guardian_name: Option<String>,
        pub guardian_contact: Option<String>,
        pub emergency_contact: Option<String>,
        pub photo_url: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct UserSearchHit {
        pub user: User,
        pub is_checked_in: bool,
    }
}

pub mod visit {
    use crate::domain::models::Visit;

    #[derive(Debug, Clone)]
    pub struct CheckInCommand {
        pub user_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct CheckInResult {
        pub visit: Visit,
        pub user_name: String,
    }

    #[derive(Debug, Clone)]
    pub struct CheckOutCommand {
        pub visit_id: String,
    }

    /// An open visit with the name of the visitor inside.
    #[derive(Debug, Clone)]
    pub struct ActiveVisit {
        pub visit: Visit,
        pub user_name: String,
    }
}

pub mod feedback {
    use crate::domain::models::Feedback;

    #[derive(Debug, Clone)]
    pub struct SubmitFeedbackCommand {
        pub visit_id: String,
        pub rating: u8,
        pub comments: String,
        pub facilities_used: Vec<String>,
    }

    #[derive(Debug, Clone)]
    pub struct SubmitFeedbackResult {
        pub feedback: Feedback,
        /// Catalogue names recorded for the visit, in request order
        pub facilities: Vec<&'static str>,
    }
}

pub mod report {
    /// Date range for the dashboard and CSV export, both `YYYY-MM-DD` and
    /// inclusive. Missing bounds fall back to the configured default window.
    #[derive(Debug, Clone, Default)]
    pub struct DashboardQuery {
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    /// A rendered CSV download.
    #[derive(Debug, Clone)]
    pub struct CsvExport {
        pub filename: String,
        pub content: String,
    }
}
