//! User administration data models.

use crate::auth::Role;
use serde::{Deserialize, Serialize};

/// Payload for the admin create-user operation. Unlike self-registration the
/// role can be chosen; it defaults to `USER`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Partial update for a user; absent fields are left untouched. The password,
/// when present, is re-hashed before it reaches the repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Repository-level patch: the password has already been hashed.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_emptiness() {
        assert!(UpdateUserRequest::default().is_empty());
        assert!(
            !UpdateUserRequest {
                email: Some("a@x.com".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_create_request_role_defaults_to_absent() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"name":"A","email":"a@x.com","password":"12345678"}"#)
                .unwrap();
        assert!(req.role.is_none());
    }
}
