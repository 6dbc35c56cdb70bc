//! Admin dashboard: visit records, summary metrics and chart series for a
//! range of site dates.
//!
//! The range is inclusive of both end dates. Visits are selected by their
//! check-in instant, from the start of `start_date` up to (not including)
//! the start of the day after `end_date`, both in site time.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use shared::{
    DailyVisitCount, DashboardReport, FacilityUsageCount, SummaryMetrics, VisitReportRow,
};

use crate::domain::clock::{format_time, SiteClock, DATE_FORMAT};
use crate::domain::commands::report::DashboardQuery;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{to_storage_timestamp, Feedback, User, Visit};
use crate::storage::{Connection, VisitDetailRecord, VisitStorage};

pub const DEFAULT_REPORT_DAYS: i64 = 30;
pub const NOT_CHECKED_OUT: &str = "Not checked out";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    visit_repository: C::VisitRepository,
    clock: SiteClock,
    default_days: i64,
}

impl<C: Connection> ReportService<C> {
    pub fn new(connection: Arc<C>, clock: SiteClock, default_days: i64) -> Self {
        Self {
            visit_repository: connection.create_visit_repository(),
            clock,
            default_days,
        }
    }

    /// Build the dashboard for the requested range
    pub async fn dashboard(&self, query: DashboardQuery) -> DomainResult<DashboardReport> {
        let (start, end) = self.resolve_range(&query)?;
        info!("Building dashboard for {} to {}", start, end);

        let (rows, skipped_visits) = self.visit_rows(start, end).await?;

        let report = DashboardReport {
            start_date: start.format(DATE_FORMAT).to_string(),
            end_date: end.format(DATE_FORMAT).to_string(),
            metrics: summarize(&rows),
            daily_visits: daily_visits(&rows),
            facility_usage: facility_usage(&rows),
            rows,
            skipped_visits,
        };

        info!(
            "Dashboard has {} visits ({} skipped)",
            report.metrics.total_visits, report.skipped_visits
        );
        Ok(report)
    }

    /// Rows for every readable visit in `[start, end]`, oldest check-in first,
    /// plus the number of visits that had to be left out
    pub async fn visit_rows(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<(Vec<VisitReportRow>, usize)> {
        let day_after_end = end
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| DomainError::validation("End date is out of range"))?;
        let day_start = |date: NaiveDate| {
            self.clock
                .start_of_day_utc(date)
                .map(|instant| to_storage_timestamp(&instant))
                .ok_or_else(|| DomainError::validation(format!("Date {} is out of range", date)))
        };
        let from = day_start(start)?;
        let until = day_start(day_after_end)?;

        let details = self.visit_repository.list_visit_details(&from, &until).await?;

        let today = self.clock.today();
        let mut rows = Vec::with_capacity(details.len());
        let mut skipped = 0;
        for detail in details {
            let visit_id = detail.visit.id.clone();
            match self.build_row(detail, today) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Skipping visit {} in report: {:#}", visit_id, e);
                    skipped += 1;
                }
            }
        }
        Ok((rows, skipped))
    }

    /// Inclusive date range for `query`, filling in the default window
    pub fn resolve_range(&self, query: &DashboardQuery) -> DomainResult<(NaiveDate, NaiveDate)> {
        let end = match non_empty(&query.end_date) {
            Some(value) => parse_date("end_date", value)?,
            None => self.clock.today(),
        };
        let start = match non_empty(&query.start_date) {
            Some(value) => parse_date("start_date", value)?,
            None => end
                .checked_sub_signed(Duration::days(self.default_days))
                .ok_or_else(|| DomainError::validation("Start date is out of range"))?,
        };

        if start > end {
            return Err(DomainError::validation(
                "Start date must not be after end date",
            ));
        }
        Ok((start, end))
    }

    fn build_row(&self, detail: VisitDetailRecord, today: NaiveDate) -> Result<VisitReportRow> {
        let visit = Visit::try_from(detail.visit)?;
        let check_in = self.clock.to_site(&visit.check_in_time);

        let (name, age, guardian, guardian_contact) = match detail.user {
            Some(record) => {
                let user = User::try_from(record)?;
                let age = user.age_on(today);
                (user.name, Some(age), user.guardian_name, user.guardian_contact)
            }
            None => (
                format!("[Deleted User {}]", visit.user_id),
                None,
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
            ),
        };

        let feedback = detail.feedback.map(Feedback::try_from).transpose()?;
        let (check_out, duration_hours) = match &visit.check_out {
            Some(closed) => {
                if closed.duration_hours < 0.0 {
                    return Err(anyhow!("negative duration {}", closed.duration_hours));
                }
                (
                    format_time(&self.clock.to_site(&closed.time)),
                    Some(round2(closed.duration_hours)),
                )
            }
            None => (NOT_CHECKED_OUT.to_string(), None),
        };

        Ok(VisitReportRow {
            visit_id: visit.id,
            date: check_in.format(DATE_FORMAT).to_string(),
            name,
            age,
            guardian,
            guardian_contact,
            check_in: format_time(&check_in),
            check_out,
            duration_hours,
            facilities_used: detail.facilities.join(", "),
            rating: feedback.as_ref().map(|f| f.rating),
            comments: feedback.map(|f| f.comments).unwrap_or_default(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` report bound. Years outside 1..=9999 are refused so
/// range bounds compare as text against stored timestamps.
fn parse_date(field: &str, value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| (1..=9999).contains(&date.year()))
        .ok_or_else(|| {
            DomainError::validation(format!(
                "Invalid {} '{}', expected YYYY-MM-DD",
                field, value
            ))
        })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

fn summarize(rows: &[VisitReportRow]) -> SummaryMetrics {
    let durations: Vec<f64> = rows.iter().filter_map(|r| r.duration_hours).collect();
    let ratings: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.rating.map(f64::from))
        .collect();

    SummaryMetrics {
        total_visits: rows.len(),
        average_duration_hours: mean(&durations),
        average_rating: mean(&ratings),
        active_visits: rows.iter().filter(|r| r.duration_hours.is_none()).count(),
    }
}

fn daily_visits(rows: &[VisitReportRow]) -> Vec<DailyVisitCount> {
    let mut by_date: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *by_date.entry(row.date.as_str()).or_default() += 1;
    }
    by_date
        .into_iter()
        .map(|(date, visits)| DailyVisitCount {
            date: date.to_string(),
            visits,
        })
        .collect()
}

fn facility_usage(rows: &[VisitReportRow]) -> Vec<FacilityUsageCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        for facility in row.facilities_used.split(", ").filter(|f| !f.is_empty()) {
            *counts.entry(facility).or_default() += 1;
        }
    }

    let mut usage: Vec<FacilityUsageCount> = counts
        .into_iter()
        .map(|(facility, times_used)| FacilityUsageCount {
            facility: facility.to_string(),
            times_used,
        })
        .collect();
    usage.sort_by(|a, b| {
        b.times_used
            .cmp(&a.times_used)
            .then_with(|| a.facility.cmp(&b.facility))
    });
    usage
}
