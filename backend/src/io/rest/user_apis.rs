//! # REST API for User Management
//!
//! Registration, lookup, search, editing and removal of makerspace users.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};
use serde::Deserialize;

use super::error::ApiError;
use super::mappers::UserMapper;
use crate::AppState;
use shared::{RegisterUserRequest, UpdateUserRequest, UserResponse};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Register a new user
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - request: {:?}", request);

    let command = UserMapper::to_register_command(request);
    match state.user_service.register_user(command).await {
        Ok(user) => {
            let response = UserResponse {
                success_message: format!("{} registered successfully", user.name),
                user: UserMapper::to_dto(user, state.clock.today()),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to register user: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/users");

    match state.user_service.list_users().await {
        Ok(users) => Json(UserMapper::to_user_list_dto(users, state.clock.today())).into_response(),
        Err(e) => {
            error!("Failed to list users: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Search users by name
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    info!("GET /api/users/search - q: {:?}", params.q);

    match state.user_service.search_users(&params.q).await {
        Ok(hits) => {
            Json(UserMapper::to_search_dto(&params.q, hits, state.clock.today())).into_response()
        }
        Err(e) => {
            error!("Failed to search users: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/users/{}", user_id);

    match state.user_service.get_user(&user_id).await {
        Ok(user) => Json(UserMapper::to_dto(user, state.clock.today())).into_response(),
        Err(e) => {
            error!("Failed to get user: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Update a user's editable fields
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/{} - request: {:?}", user_id, request);

    let command = UserMapper::to_update_command(request);
    match state.user_service.update_user(&user_id, command).await {
        Ok(user) => {
            let response = UserResponse {
                success_message: "User updated successfully".to_string(),
                user: UserMapper::to_dto(user, state.clock.today()),
            };
            Json(response).into_response()
        }
        Err(e) => {
            error!("Failed to update user: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Delete a user. Their visits stay in the records.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/users/{}", user_id);

    match state.user_service.delete_user(&user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete user: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
