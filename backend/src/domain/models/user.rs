use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use super::{generate_id, parse_instant, to_storage_timestamp};
use crate::domain::calculations::calculate_age;
use crate::domain::clock::DATE_FORMAT;
use crate::storage::records::UserRecord;

/// A registered makerspace user. Age is always derived from `birthdate`.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub birthdate: NaiveDate,
    pub guardian_name: String,
    pub guardian_contact: String,
    pub emergency_contact: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn generate_id() -> String {
        generate_id("user")
    }

    pub fn age_on(&self, today: NaiveDate) -> i32 {
        calculate_age(self.birthdate, today)
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            birthdate: self.birthdate.format(DATE_FORMAT).to_string(),
            guardian_name: self.guardian_name.clone(),
            guardian_contact: self.guardian_contact.clone(),
            emergency_contact: self.emergency_contact.clone(),
            photo_url: self.photo_url.clone(),
            created_at: to_storage_timestamp(&self.created_at),
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = anyhow::Error;

    fn try_from(record: UserRecord) -> Result<Self> {
        let birthdate = NaiveDate::parse_from_str(&record.birthdate, DATE_FORMAT)
            .with_context(|| format!("Invalid birthdate for user {}: {}", record.id, record.birthdate))?;
        let created_at = parse_instant(&record.created_at, "created_at")?.with_timezone(&Utc);

        Ok(User {
            id: record.id,
            name: record.name,
            birthdate,
            guardian_name: record.guardian_name,
            guardian_contact: record.guardian_contact,
            emergency_contact: record.emergency_contact,
            photo_url: record.photo_url,
            created_at,
        })
    }
}
