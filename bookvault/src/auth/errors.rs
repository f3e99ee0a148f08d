//! Authentication error types.

use crate::session::SessionError;
use crate::validation::FieldError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session cache error
    #[error("Session cache error: {0}")]
    Cache(#[from] SessionError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Login rejected. Deliberately does not say whether the email or the
    /// password was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// One or more request fields failed validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Update request carried no fields
    #[error("No data provided to update")]
    NoFieldsToUpdate,

    /// Refresh token missing from the request
    #[error("Refresh token is required")]
    MissingToken,

    /// Token past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Token signature or structure invalid, or superseded by a rotation
    #[error("Token is not valid")]
    TokenInvalid,

    /// No refresh token stored for this user
    #[error("Refresh token not found")]
    TokenNotFound,

    /// JWT encoding error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database, cache, and JWT errors are sanitized to prevent information
    /// disclosure about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Cache(_) => "Internal server error".to_string(),
            AuthError::Jwt(_) | AuthError::HashingFailed => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_sanitized() {
        let err = AuthError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_domain_errors_pass_through() {
        assert_eq!(
            AuthError::InvalidCredentials.client_message(),
            "Invalid email or password"
        );
        assert_eq!(AuthError::TokenExpired.client_message(), "Token expired");
    }
}
