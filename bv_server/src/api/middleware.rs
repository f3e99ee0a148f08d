//! Authentication and authorization middleware for protected endpoints.
//!
//! `authenticate` validates the JWT access token from the Authorization
//! header and injects an [`AuthPrincipal`] into request extensions.
//! `require_admin` runs after it and rejects non-admin principals.
//!
//! # Extracting the principal
//!
//! In handler functions, extract the principal from request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use bv_server::api::middleware::AuthPrincipal;
//!
//! async fn protected_handler(Extension(principal): Extension<AuthPrincipal>) -> String {
//!     format!("Authenticated as user {}", principal.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use bookvault::auth::{Role, UserId};

use super::AppState;
use super::error::ApiError;

/// The authenticated caller, as proven by the access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthPrincipal {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthPrincipal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authentication middleware that validates JWT tokens and injects the
/// principal.
///
/// Expects `Authorization: Bearer <token>`.
///
/// # Behavior
///
/// - **Success**: Injects [`AuthPrincipal`] into request extensions
/// - **Missing/malformed header**: `401 Unauthorized`
/// - **Expired token**: `401 Unauthorized`
/// - **Invalid token**: `403 Forbidden`
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Authentication token is required"))?;

    let claims = state.auth_manager.verify_access_token(token)?;
    request.extensions_mut().insert(AuthPrincipal {
        user_id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

/// Authorization middleware for admin-only routes.
///
/// Must be layered after [`authenticate`] so the principal is present;
/// a request that somehow reaches it unauthenticated is rejected.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<AuthPrincipal>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("Authentication token is required"))?;

    if !principal.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }
    Ok(next.run(request).await)
}
