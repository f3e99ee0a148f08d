//! Authentication API handlers.
//!
//! HTTP REST endpoints for the session lifecycle:
//! - Registration with name, email, and password
//! - Login returning an access/refresh token pair
//! - Token refresh with rotation
//! - Logout to invalidate the refresh token
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:3000/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Reader One", "email": "reader@example.com", "password": "SecurePass123"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:3000/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "reader@example.com", "password": "SecurePass123"}'
//! ```

use axum::{Json, extract::Extension, extract::State, http::StatusCode};
use bookvault::auth::{AuthError, LoginRequest, RegisterRequest, User};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use super::error::ApiError;
use super::middleware::AuthPrincipal;
use super::request_id::RequestId;
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Register a new user account.
///
/// # Response
///
/// On success, returns `201 Created` with the user record; the password is
/// never part of the response:
/// ```json
/// {
///   "id": 42,
///   "name": "Reader One",
///   "email": "reader@example.com",
///   "role": "USER",
///   "created_at": "2026-08-30T10:30:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failures as `{"errors": [{field, message}]}`,
///   including an already registered email
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.auth_manager.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticate a user and generate session tokens.
///
/// # Response
///
/// On success, returns `200 OK` with the token pair:
/// ```json
/// {
///   "accessToken": "eyJhbGciOiJIUzI1NiIs...",
///   "refreshToken": "eyJhbGciOiJIUzI1NiIs..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Wrong email or password; the response does not say
///   which
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let email = payload.email.clone();
    match state.auth_manager.login(payload).await {
        Ok((_user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(Json(TokenPairResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            }))
        }
        Err(err) => {
            if matches!(err, AuthError::InvalidCredentials) {
                metrics::login_attempts_total(false);
                logging::log_security_event(
                    "failed_login",
                    Some(request_id.as_str()),
                    &format!("Rejected login for {email}"),
                );
            }
            Err(err.into())
        }
    }
}

/// Exchange a refresh token for a new token pair.
///
/// The presented token must be the one currently stored for the user; on
/// success both tokens are reissued and the old refresh token is retired.
///
/// # Request Body
///
/// ```json
/// { "refreshToken": "eyJhbGciOiJIUzI1NiIs..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Token missing from the body, or expired
/// - `403 Forbidden`: Token invalid, rotated out, or no live session
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let refresh_token = payload.refresh_token.ok_or(AuthError::MissingToken)?;

    let tokens = state.auth_manager.refresh(&refresh_token).await?;
    metrics::token_refreshes_total();
    Ok(Json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// Logout and invalidate the caller's refresh token.
///
/// Idempotent. The access token keeps working until it expires naturally;
/// only the refresh path dies immediately.
///
/// # Response
///
/// On success, returns `200 OK`:
/// ```json
/// { "message": "Logged out successfully" }
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthPrincipal>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth_manager.logout(principal.user_id).await?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}
