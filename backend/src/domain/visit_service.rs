//! Check-in and check-out of visitors.

use log::{info, warn};
use std::sync::Arc;

use crate::domain::clock::SiteClock;
use crate::domain::commands::visit::{ActiveVisit, CheckInCommand, CheckInResult, CheckOutCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{to_storage_timestamp, User, Visit};
use crate::storage::{Connection, UserStorage, VisitStorage};

#[derive(Clone)]
pub struct VisitService<C: Connection> {
    user_repository: C::UserRepository,
    visit_repository: C::VisitRepository,
    clock: SiteClock,
}

impl<C: Connection> VisitService<C> {
    pub fn new(connection: Arc<C>, clock: SiteClock) -> Self {
        Self {
            user_repository: connection.create_user_repository(),
            visit_repository: connection.create_visit_repository(),
            clock,
        }
    }

    /// Open a visit for the user at the current site time
    pub async fn check_in(&self, command: CheckInCommand) -> DomainResult<CheckInResult> {
        info!("Checking in user: {}", command.user_id);

        let user = match self.user_repository.get_user(&command.user_id).await? {
            Some(record) => User::try_from(record)?,
            None => {
                warn!("Check-in for unknown user: {}", command.user_id);
                return Err(DomainError::not_found("User", command.user_id));
            }
        };

        if self
            .visit_repository
            .get_open_visit_for_user(&command.user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict("User is already checked in"));
        }

        let visit = Visit::open(&command.user_id, self.clock.now());

        // The open-visit index still rejects a concurrent check-in that raced past the lookup
        if !self.visit_repository.create_visit(&visit.to_record()).await? {
            return Err(DomainError::conflict("User is already checked in"));
        }

        info!("Checked in {} ({}) with visit {}", user.name, user.id, visit.id);
        Ok(CheckInResult {
            visit,
            user_name: user.name,
        })
    }

    /// Close an open visit at the current site time and record its duration
    pub async fn check_out(&self, command: CheckOutCommand) -> DomainResult<Visit> {
        info!("Checking out visit: {}", command.visit_id);

        let record = match self.visit_repository.get_visit(&command.visit_id).await? {
            Some(record) => record,
            None => {
                warn!("Check-out for unknown visit: {}", command.visit_id);
                return Err(DomainError::not_found("Visit", command.visit_id));
            }
        };

        let mut visit = Visit::try_from(record)?;
        if !visit.is_open() {
            return Err(DomainError::conflict("Visit is already checked out"));
        }

        let now = self.clock.now();
        if now < visit.check_in_time {
            warn!(
                "Check-out time {} precedes check-in time {} for visit {}",
                now, visit.check_in_time, visit.id
            );
            return Err(DomainError::validation(
                "Check-out time cannot be earlier than check-in time",
            ));
        }

        let check_out = visit.check_out_at(now);
        let closed = self
            .visit_repository
            .close_visit(
                &visit.id,
                &to_storage_timestamp(&check_out.time),
                check_out.duration_hours,
            )
            .await?;
        if !closed {
            return Err(DomainError::conflict("Visit is already checked out"));
        }

        info!(
            "Checked out visit {} after {:.2} hours",
            visit.id, check_out.duration_hours
        );
        visit.check_out = Some(check_out);
        Ok(visit)
    }

    /// Open visits of existing users, earliest check-in first
    pub async fn list_active_visits(&self) -> DomainResult<Vec<ActiveVisit>> {
        let records = self.visit_repository.list_open_visits().await?;

        let mut active = Vec::with_capacity(records.len());
        for record in records {
            let visit_id = record.visit.id.clone();
            match Visit::try_from(record.visit) {
                Ok(visit) => active.push(ActiveVisit {
                    visit,
                    user_name: record.user_name,
                }),
                Err(e) => warn!("Skipping unreadable visit {}: {:#}", visit_id, e),
            }
        }

        info!("Found {} active visits", active.len());
        Ok(active)
    }

    pub async fn active_visit_count(&self) -> DomainResult<u64> {
        Ok(self.visit_repository.count_open_visits().await?)
    }

    pub fn clock(&self) -> &SiteClock {
        &self.clock
    }
}
