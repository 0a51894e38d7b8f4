//! HTTP handlers for the REST API.
//!
//! Each handler performs one service-layer call and maps the outcome to
//! JSON. Errors are converted to [`AppError`] at this boundary.

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

use super::dto::{
    CreateUserRequest, HealthResponse, MessageResponse, UpdateUserRequest, UserMessageResponse,
};
use super::error::AppError;
use super::extract::Payload;
use super::state::AppState;
use crate::api::{User, UserId};
use crate::db::services as db_services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const INDEX_HTML: &str = include_str!("../../static/index.html");

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse::<UserId>()
        .map_err(|_| AppError::BadRequest(format!("Invalid user id: {}", raw)))
}

// =============================================================================
// Static page & health
// =============================================================================

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database,
    }))
}

// =============================================================================
// User CRUD
// =============================================================================

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> HandlerResult<Vec<User>> {
    let users = db_services::list_users(state.repository.as_ref())
        .await
        .map_err(|e| AppError::repository(e, "Failed to fetch users"))?;

    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<User> {
    let id = parse_user_id(&id)?;
    let user = db_services::get_user(state.repository.as_ref(), id)
        .await
        .map_err(|e| AppError::repository(e, "Failed to fetch user"))?;

    Ok(Json(user))
}

/// POST /api/users (JSON or form body)
pub async fn create_user(
    State(state): State<AppState>,
    Payload(request): Payload<CreateUserRequest>,
) -> HandlerResult<UserMessageResponse> {
    let user = db_services::create_user(state.repository.as_ref(), request.into())
        .await
        .map_err(|e| AppError::repository(e, "Failed to create user"))?;

    Ok(Json(UserMessageResponse {
        user,
        message: "User created successfully".to_string(),
    }))
}

/// PUT /api/users/{id} (JSON or form body)
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(request): Payload<UpdateUserRequest>,
) -> HandlerResult<UserMessageResponse> {
    let id = parse_user_id(&id)?;
    let user = db_services::update_user(state.repository.as_ref(), id, request.into())
        .await
        .map_err(|e| AppError::repository(e, "Failed to update user"))?;

    Ok(Json(UserMessageResponse {
        user,
        message: "User updated successfully".to_string(),
    }))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    let id = parse_user_id(&id)?;
    db_services::delete_user(state.repository.as_ref(), id)
        .await
        .map_err(|e| AppError::repository(e, "Failed to delete user"))?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
