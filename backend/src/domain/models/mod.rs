//! Domain models for users, visits and feedback.

pub mod facility;
pub mod feedback;
pub mod user;
pub mod visit;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};

pub use facility::{canonical_facility, FACILITIES};
pub use feedback::{FacilityUsage, Feedback};
pub use user::User;
pub use visit::{CheckOut, Visit};

/// Format an instant the way it is stored: UTC, millisecond precision, `Z` suffix.
pub fn to_storage_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_instant(value: &str, field: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid {} timestamp: {}", field, value))
}

/// Treat blank optional text as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn generate_id(prefix: &str) -> String {
    format!("{}::{}", prefix, uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_timestamp_is_utc_millis() {
        let instant = DateTime::parse_from_rfc3339("2024-01-01T09:00:00+08:00").unwrap();
        assert_eq!(to_storage_timestamp(&instant), "2024-01-01T01:00:00.000Z");
    }

    #[test]
    fn test_storage_timestamps_sort_chronologically() {
        let early = DateTime::parse_from_rfc3339("2024-01-01T23:00:00+08:00").unwrap();
        let late = DateTime::parse_from_rfc3339("2024-01-01T16:30:00+00:00").unwrap();
        assert!(to_storage_timestamp(&early) < to_storage_timestamp(&late));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
