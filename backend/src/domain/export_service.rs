//! CSV export of the dashboard's visit records.

use log::info;

use shared::VisitReportRow;

use crate::domain::clock::DATE_FORMAT;
use crate::domain::commands::report::{CsvExport, DashboardQuery};
use crate::domain::errors::DomainResult;
use crate::domain::report_service::ReportService;
use crate::storage::Connection;

pub const CSV_HEADER: [&str; 11] = [
    "Date",
    "Name",
    "Age",
    "Guardian",
    "Guardian Contact",
    "Check-in Time",
    "Check-out Time",
    "Duration (hours)",
    "Facilities Used",
    "Feedback Rating",
    "Feedback Comments",
];

#[derive(Clone)]
pub struct ExportService<C: Connection> {
    report_service: ReportService<C>,
}

impl<C: Connection> ExportService<C> {
    pub fn new(report_service: ReportService<C>) -> Self {
        Self { report_service }
    }

    /// Render the visit records for the requested range as a CSV download
    pub async fn export_csv(&self, query: DashboardQuery) -> DomainResult<CsvExport> {
        let (start, end) = self.report_service.resolve_range(&query)?;
        let (rows, skipped) = self.report_service.visit_rows(start, end).await?;

        let content = render_csv(&rows)?;
        let filename = format!(
            "visits_{}_{}.csv",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        );

        info!(
            "Exported {} visits to {} ({} skipped, {} bytes)",
            rows.len(),
            filename,
            skipped,
            content.len()
        );
        Ok(CsvExport { filename, content })
    }
}

fn render_csv(rows: &[VisitReportRow]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for row in rows {
        writer.write_record([
            row.date.clone(),
            row.name.clone(),
            row.age.map(|age| age.to_string()).unwrap_or_default(),
            row.guardian.clone(),
            row.guardian_contact.clone(),
            row.check_in.clone(),
            row.check_out.clone(),
            row.duration_hours
                .map(|hours| format!("{:.2}", hours))
                .unwrap_or_default(),
            row.facilities_used.clone(),
            row.rating.map(|rating| rating.to_string()).unwrap_or_default(),
            row.comments.clone(),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
