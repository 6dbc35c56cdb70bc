use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};

use super::{generate_id, parse_instant, to_storage_timestamp};
use crate::domain::calculations::calculate_duration_hours;
use crate::storage::records::VisitRecord;

/// The closing half of a visit. Check-out time and duration only ever exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOut {
    pub time: DateTime<FixedOffset>,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub id: String,
    pub user_id: String,
    pub check_in_time: DateTime<FixedOffset>,
    pub check_out: Option<CheckOut>,
    pub created_at: DateTime<Utc>,
}

impl Visit {
    pub fn generate_id() -> String {
        generate_id("visit")
    }

    /// A new open visit starting at `check_in_time`.
    pub fn open(user_id: &str, check_in_time: DateTime<FixedOffset>) -> Self {
        Visit {
            id: Self::generate_id(),
            user_id: user_id.to_string(),
            check_in_time,
            check_out: None,
            created_at: check_in_time.with_timezone(&Utc),
        }
    }

    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// The check-out that would close this visit at `at`.
    pub fn check_out_at(&self, at: DateTime<FixedOffset>) -> CheckOut {
        CheckOut {
            time: at,
            duration_hours: calculate_duration_hours(&self.check_in_time, &at),
        }
    }

    pub fn to_record(&self) -> VisitRecord {
        VisitRecord {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            check_in_time: to_storage_timestamp(&self.check_in_time),
            check_out_time: self.check_out.as_ref().map(|c| to_storage_timestamp(&c.time)),
            duration: self.check_out.as_ref().map(|c| c.duration_hours),
            created_at: to_storage_timestamp(&self.created_at),
        }
    }
}

impl TryFrom<VisitRecord> for Visit {
    type Error = anyhow::Error;

    fn try_from(record: VisitRecord) -> Result<Self> {
        let check_in_time = parse_instant(&record.check_in_time, "check_in_time")?;
        let check_out = match (record.check_out_time, record.duration) {
            (Some(time), Some(duration_hours)) => Some(CheckOut {
                time: parse_instant(&time, "check_out_time")?,
                duration_hours,
            }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "Visit {} has a check-out time without a duration or vice versa",
                    record.id
                ))
            }
        };
        let created_at = parse_instant(&record.created_at, "created_at")?.with_timezone(&Utc);

        Ok(Visit {
            id: record.id,
            user_id: record.user_id,
            check_in_time,
            check_out,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_open_visit() {
        let visit = Visit::open("user::1", at("2024-01-01T09:00:00+08:00"));
        assert!(visit.is_open());
        assert!(visit.id.starts_with("visit::"));

        let record = visit.to_record();
        assert_eq!(record.check_in_time, "2024-01-01T01:00:00.000Z");
        assert_eq!(record.check_out_time, None);
        assert_eq!(record.duration, None);
    }

    #[test]
    fn test_check_out_at() {
        let visit = Visit::open("user::1", at("2024-01-01T09:00:00+08:00"));
        let check_out = visit.check_out_at(at("2024-01-01T17:30:00+08:00"));
        assert_eq!(check_out.duration_hours, 8.5);
    }

    #[test]
    fn test_half_closed_record_is_rejected() {
        let mut record = Visit::open("user::1", at("2024-01-01T09:00:00+08:00")).to_record();
        record.check_out_time = Some("2024-01-01T02:00:00.000Z".to_string());
        assert!(Visit::try_from(record.clone()).is_err());

        record.check_out_time = None;
        record.duration = Some(1.0);
        assert!(Visit::try_from(record).is_err());
    }

    #[test]
    fn test_closed_record_round_trip() {
        let mut visit = Visit::open("user::1", at("2024-01-01T09:00:00+08:00"));
        visit.check_out = Some(visit.check_out_at(at("2024-01-01T10:15:00+08:00")));

        let parsed = Visit::try_from(visit.to_record()).unwrap();
        let check_out = parsed.check_out.unwrap();
        assert_eq!(check_out.duration_hours, 1.25);
        assert_eq!(check_out.time, at("2024-01-01T10:15:00+08:00"));
    }
}
