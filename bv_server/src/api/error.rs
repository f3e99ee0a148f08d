//! HTTP error responses.
//!
//! Central mapping from domain errors to status codes and JSON bodies.
//! Validation failures become a structured `{"errors": [...]}` list; every
//! other failure is `{"error": "..."}` with a client-safe message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookvault::auth::AuthError;
use bookvault::books::BookError;
use bookvault::validation::FieldError;
use serde_json::json;

/// A fully resolved error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later",
        )
    }

    fn validation(errors: &[FieldError]) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "errors": errors }),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Validation(errors) => return Self::validation(errors),
            AuthError::NoFieldsToUpdate => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::TokenInvalid | AuthError::TokenNotFound => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_)
            | AuthError::Cache(_)
            | AuthError::Jwt(_)
            | AuthError::HashingFailed => {
                tracing::error!(error = %err, "auth operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, &err.client_message())
    }
}

impl From<BookError> for ApiError {
    fn from(err: BookError) -> Self {
        let status = match &err {
            BookError::Validation(errors) => return Self::validation(errors),
            BookError::NoFieldsToUpdate => StatusCode::BAD_REQUEST,
            BookError::NotFound => StatusCode::NOT_FOUND,
            BookError::NotOwner => StatusCode::FORBIDDEN,
            BookError::Database(_) => {
                tracing::error!(error = %err, "book operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, &err.client_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_become_structured_400() {
        let err = ApiError::from(AuthError::Validation(vec![FieldError::new(
            "email",
            "Email is not valid",
        )]));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body["errors"][0]["field"], "email");
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = ApiError::from(AuthError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body["error"], "Internal server error");
    }

    #[test]
    fn test_token_status_split() {
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::TokenInvalid).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::TokenNotFound).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_ownership_violation_is_403() {
        assert_eq!(
            ApiError::from(BookError::NotOwner).status(),
            StatusCode::FORBIDDEN
        );
    }
}
