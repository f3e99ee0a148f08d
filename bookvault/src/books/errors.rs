//! Book catalog error types.

use crate::validation::FieldError;
use thiserror::Error;

/// Book catalog errors
#[derive(Debug, Error)]
pub enum BookError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Book not found
    #[error("Book not found")]
    NotFound,

    /// Caller is neither the owner of the book nor an admin
    #[error("You do not have permission to modify this book")]
    NotOwner,

    /// Update request carried no fields
    #[error("No data provided to update")]
    NoFieldsToUpdate,

    /// One or more request fields failed validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
}

impl BookError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            BookError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for book catalog operations
pub type BookResult<T> = Result<T, BookError>;
