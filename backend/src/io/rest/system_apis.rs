//! # REST API for System Status
//!
//! Health check, site clock and sidebar quick stats.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info, warn};

use super::error::ApiError;
use crate::domain::clock::{format_long, DATE_FORMAT};
use crate::AppState;
use shared::{HealthResponse, QuickStats, SiteClockResponse, TableStatus};

/// Probe every table. Responds 503 when any is unreachable.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/health");

    let tables: Vec<TableStatus> = state
        .db
        .check_tables()
        .await
        .into_iter()
        .map(|check| TableStatus {
            table: check.table.to_string(),
            accessible: check.error.is_none(),
            error: check.error,
        })
        .collect();
    let ok = tables.iter().all(|t| t.accessible);

    let status = if ok {
        StatusCode::OK
    } else {
        warn!("Health check failed: {:?}", tables);
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse { ok, tables }))
}

/// Current time at the site
pub async fn get_clock(State(state): State<AppState>) -> impl IntoResponse {
    let now = state.clock.now();
    Json(SiteClockResponse {
        now: now.to_rfc3339(),
        display: format_long(&now),
        today: now.date_naive().format(DATE_FORMAT).to_string(),
    })
}

/// Number of visitors currently inside
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/stats");

    match state.visit_service.active_visit_count().await {
        Ok(count) => Json(QuickStats {
            active_users: count as usize,
        })
        .into_response(),
        Err(e) => {
            error!("Failed to load stats: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
