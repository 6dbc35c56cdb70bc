//! # REST API for Feedback

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use super::error::ApiError;
use super::mappers::FeedbackMapper;
use crate::AppState;
use shared::{FacilityListResponse, SubmitFeedbackRequest};

/// Submit feedback for a finished visit
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(visit_id): Path<String>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> impl IntoResponse {
    info!("POST /api/visits/{}/feedback - request: {:?}", visit_id, request);

    let command = FeedbackMapper::to_submit_command(visit_id, request);
    match state.feedback_service.submit_feedback(command).await {
        Ok(result) => (StatusCode::CREATED, Json(FeedbackMapper::to_submit_dto(result))).into_response(),
        Err(e) => {
            error!("Failed to submit feedback: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// The facility catalogue
pub async fn list_facilities(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/facilities");

    let facilities = state
        .feedback_service
        .list_facilities()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(FacilityListResponse { facilities })
}
