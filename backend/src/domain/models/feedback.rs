use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use super::{generate_id, parse_instant, to_storage_timestamp};
use crate::storage::records::{FacilityUsageRecord, FeedbackRecord};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Post-visit feedback. A visit has at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: String,
    pub visit_id: String,
    pub rating: u8,
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(visit_id: &str, rating: u8, comments: String, created_at: DateTime<Utc>) -> Self {
        Feedback {
            id: generate_id("feedback"),
            visit_id: visit_id.to_string(),
            rating,
            comments,
            created_at,
        }
    }

    pub fn is_valid_rating(rating: u8) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&rating)
    }

    pub fn to_record(&self) -> FeedbackRecord {
        FeedbackRecord {
            id: self.id.clone(),
            visit_id: self.visit_id.clone(),
            rating: i64::from(self.rating),
            comments: self.comments.clone(),
            created_at: to_storage_timestamp(&self.created_at),
        }
    }
}

impl TryFrom<FeedbackRecord> for Feedback {
    type Error = anyhow::Error;

    fn try_from(record: FeedbackRecord) -> Result<Self> {
        let rating = u8::try_from(record.rating)
            .ok()
            .filter(|r| Feedback::is_valid_rating(*r))
            .ok_or_else(|| anyhow!("Feedback {} has rating {}", record.id, record.rating))?;

        Ok(Feedback {
            created_at: parse_instant(&record.created_at, "created_at")?.with_timezone(&Utc),
            id: record.id,
            visit_id: record.visit_id,
            rating,
            comments: record.comments,
        })
    }
}

/// One facility a visitor reported using during a visit.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityUsage {
    pub id: String,
    pub visit_id: String,
    pub facility_name: String,
    pub created_at: DateTime<Utc>,
}

impl FacilityUsage {
    pub fn new(visit_id: &str, facility_name: &str, created_at: DateTime<Utc>) -> Self {
        FacilityUsage {
            id: generate_id("usage"),
            visit_id: visit_id.to_string(),
            facility_name: facility_name.to_string(),
            created_at,
        }
    }

    pub fn to_record(&self) -> FacilityUsageRecord {
        FacilityUsageRecord {
            id: self.id.clone(),
            visit_id: self.visit_id.clone(),
            facility_name: self.facility_name.clone(),
            created_at: to_storage_timestamp(&self.created_at),
        }
    }
}
