//! User administration API handlers.
//!
//! REST endpoints for managing user accounts. Reads are public; the write
//! routes are admin-only, enforced by the routing layer's authorization
//! middleware. The password hash never appears in any response.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bookvault::auth::User;
use bookvault::users::{CreateUserRequest, UpdateUserRequest};

use super::AppState;
use super::error::ApiError;

/// List all users, newest first.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.user_manager.list().await?;
    Ok(Json(users))
}

/// Fetch a single user.
///
/// # Errors
///
/// - `404 Not Found`: No user with this id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state.user_manager.get(user_id).await?;
    Ok(Json(user))
}

/// Create a user with an explicit role (`role` defaults to `USER`).
///
/// # Response
///
/// On success, returns `201 Created` with the user record.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failures as `{"errors": [...]}`
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.user_manager.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Apply a partial update to a user.
///
/// # Errors
///
/// - `400 Bad Request`: Empty update or validation failures
/// - `404 Not Found`: No user with this id
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state.user_manager.update(user_id, payload).await?;
    Ok(Json(user))
}

/// Delete a user.
///
/// # Response
///
/// On success, returns `200 OK` with the removed record.
///
/// # Errors
///
/// - `404 Not Found`: No user with this id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state.user_manager.delete(user_id).await?;
    Ok(Json(user))
}
