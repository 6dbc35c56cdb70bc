//! # Storage Module
//!
//! Data persistence for the check-in service. The domain layer only sees the
//! traits in [`traits`] and the row shapes in [`records`]; the SQLite backend
//! lives in [`sqlite`].
//!
//! Instants are stored as UTC RFC 3339 text and birthdates as `YYYY-MM-DD`,
//! so range filters on check-in time are plain text comparisons.

pub mod records;
pub mod sqlite;
pub mod traits;

pub use records::*;
pub use sqlite::DbConnection;
pub use traits::{Connection, FeedbackStorage, UserStorage, VisitStorage};
