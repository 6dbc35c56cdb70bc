//! # REST API for Reports
//!
//! The admin dashboard and its CSV download.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::mappers::ReportMapper;
use crate::AppState;
use shared::DashboardRequest;

/// Dashboard for a date range
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(request): Query<DashboardRequest>,
) -> impl IntoResponse {
    info!("GET /api/reports/dashboard - request: {:?}", request);

    match state.report_service.dashboard(ReportMapper::to_query(request)).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!("Failed to build dashboard: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Visit records for a date range as a CSV attachment
pub async fn export_csv(
    State(state): State<AppState>,
    Query(request): Query<DashboardRequest>,
) -> impl IntoResponse {
    info!("GET /api/reports/export.csv - request: {:?}", request);

    match state.export_service.export_csv(ReportMapper::to_query(request)).await {
        Ok(export) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.filename),
                ),
            ],
            export.content,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export CSV: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
