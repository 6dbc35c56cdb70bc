//! # REST API for Visits
//!
//! Check-in, check-out and the list of visitors currently inside.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::mappers::VisitMapper;
use crate::domain::commands::visit::{CheckInCommand, CheckOutCommand};
use crate::AppState;
use shared::CheckInRequest;

/// Check a user in
pub async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> impl IntoResponse {
    info!("POST /api/visits/check-in - request: {:?}", request);

    let command = CheckInCommand {
        user_id: request.user_id,
    };
    match state.visit_service.check_in(command).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(VisitMapper::to_check_in_dto(result, &state.clock)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to check in: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Check a visit out
pub async fn check_out(
    State(state): State<AppState>,
    Path(visit_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/visits/{}/check-out", visit_id);

    match state.visit_service.check_out(CheckOutCommand { visit_id }).await {
        Ok(visit) => Json(VisitMapper::to_check_out_dto(visit, &state.clock)).into_response(),
        Err(e) => {
            error!("Failed to check out: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Visitors currently inside
pub async fn list_active_visits(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/visits/active");

    match state.visit_service.list_active_visits().await {
        Ok(active) => Json(VisitMapper::to_active_visits_dto(active, &state.clock)).into_response(),
        Err(e) => {
            error!("Failed to list active visits: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
