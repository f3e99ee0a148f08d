//! Request payload validation.
//!
//! Managers validate inbound data before touching the repositories and report
//! failures as a structured list of field errors that maps straight onto a
//! 400 response body.

use serde::{Deserialize, Serialize};

/// A single validation failure tied to a named input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulates field errors across the checks for one payload.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Require a non-empty value of at least `min` characters.
    pub fn require_min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.trim().is_empty() {
            self.reject(field, &format!("{field} must not be empty"));
        } else if value.chars().count() < min {
            self.reject(field, &format!("{field} must be at least {min} characters"));
        }
    }

    /// Require a length inside an inclusive range.
    pub fn require_len_between(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.reject(
                field,
                &format!("{field} must be between {min} and {max} characters"),
            );
        }
    }

    pub fn require_email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.reject(field, "Email is not valid");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the validator, returning the collected errors when any check
    /// failed.
    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || value.contains(' ') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Published year must be a plausible 4-digit year.
pub fn is_valid_year(year: i32) -> bool {
    (1000..=9999).contains(&year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user name@example.com"));
    }

    #[test]
    fn test_validator_collects_multiple_errors() {
        let mut v = Validator::new();
        v.require_min_len("name", "", 3);
        v.require_email("email", "bogus");
        v.require_min_len("password", "short", 8);

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].field, "email");
        assert_eq!(errors[2].field, "password");
    }

    #[test]
    fn test_validator_passes_clean_input() {
        let mut v = Validator::new();
        v.require_min_len("name", "Alice", 3);
        v.require_email("email", "alice@example.com");
        v.require_len_between("isbn", "9781234567", 3, 13);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_year_bounds() {
        assert!(is_valid_year(1984));
        assert!(!is_valid_year(999));
        assert!(!is_valid_year(10000));
    }
}
