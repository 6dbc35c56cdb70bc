//! Post-visit feedback and facility usage.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::clock::SiteClock;
use crate::domain::commands::feedback::{SubmitFeedbackCommand, SubmitFeedbackResult};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::feedback::{MAX_RATING, MIN_RATING};
use crate::domain::models::{canonical_facility, FacilityUsage, Feedback, Visit, FACILITIES};
use crate::storage::{Connection, FeedbackStorage, VisitStorage};

#[derive(Clone)]
pub struct FeedbackService<C: Connection> {
    visit_repository: C::VisitRepository,
    feedback_repository: C::FeedbackRepository,
    clock: SiteClock,
}

impl<C: Connection> FeedbackService<C> {
    pub fn new(connection: Arc<C>, clock: SiteClock) -> Self {
        Self {
            visit_repository: connection.create_visit_repository(),
            feedback_repository: connection.create_feedback_repository(),
            clock,
        }
    }

    /// Record feedback for a finished visit together with the facilities used
    pub async fn submit_feedback(
        &self,
        command: SubmitFeedbackCommand,
    ) -> DomainResult<SubmitFeedbackResult> {
        info!(
            "Submitting feedback for visit {}: rating={}, facilities={:?}",
            command.visit_id, command.rating, command.facilities_used
        );

        let record = match self.visit_repository.get_visit(&command.visit_id).await? {
            Some(record) => record,
            None => {
                warn!("Feedback for unknown visit: {}", command.visit_id);
                return Err(DomainError::not_found("Visit", command.visit_id));
            }
        };
        if Visit::try_from(record)?.is_open() {
            return Err(DomainError::conflict(
                "Feedback can only be given after checking out",
            ));
        }

        if !Feedback::is_valid_rating(command.rating) {
            return Err(DomainError::validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let facilities = resolve_facilities(&command.facilities_used)?;

        if self.feedback_repository.has_feedback(&command.visit_id).await? {
            return Err(DomainError::conflict(
                "Feedback has already been submitted for this visit",
            ));
        }

        let now = self.clock.now().with_timezone(&Utc);
        let feedback = Feedback::new(
            &command.visit_id,
            command.rating,
            command.comments.trim().to_string(),
            now,
        );
        let usages: Vec<_> = facilities
            .iter()
            .map(|facility| FacilityUsage::new(&command.visit_id, facility, now).to_record())
            .collect();

        // The unique visit_id still rejects a concurrent submission that raced past the lookup
        if !self
            .feedback_repository
            .store_feedback(&feedback.to_record(), &usages)
            .await?
        {
            return Err(DomainError::conflict(
                "Feedback has already been submitted for this visit",
            ));
        }

        info!(
            "Stored feedback {} with {} facilities for visit {}",
            feedback.id,
            facilities.len(),
            feedback.visit_id
        );
        Ok(SubmitFeedbackResult {
            feedback,
            facilities,
        })
    }

    pub fn list_facilities(&self) -> Vec<&'static str> {
        FACILITIES.to_vec()
    }
}

/// Map requested names onto the catalogue, keeping first occurrences only
fn resolve_facilities(requested: &[String]) -> DomainResult<Vec<&'static str>> {
    let mut resolved: Vec<&'static str> = Vec::with_capacity(requested.len());
    for name in requested {
        let facility = canonical_facility(name)
            .ok_or_else(|| DomainError::validation(format!("Unknown facility: {}", name.trim())))?;
        if !resolved.contains(&facility) {
            resolved.push(facility);
        }
    }
    Ok(resolved)
}
