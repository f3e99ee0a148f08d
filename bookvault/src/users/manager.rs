//! User administration manager implementation.

use super::models::{CreateUserRequest, UpdateUserRequest, UserPatch};
use crate::auth::{AuthError, AuthResult, Role, User, UserId, password};
use crate::db::UserRepository;
use crate::validation::Validator;
use log::debug;
use std::sync::Arc;

/// Admin-facing user management. Route-level authorization has already
/// happened by the time these methods run; they only enforce data rules.
#[derive(Clone)]
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    pepper: String,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>, pepper: String) -> Self {
        Self { users, pepper }
    }

    /// List all users, newest first
    pub async fn list(&self) -> AuthResult<Vec<User>> {
        self.users.list_users().await
    }

    /// Fetch a single user
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No user with this id
    pub async fn get(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Create a user with an explicit role (defaults to `USER`)
    ///
    /// Applies the same field rules as self-registration; only the role
    /// choice is extra.
    pub async fn create(&self, request: CreateUserRequest) -> AuthResult<User> {
        let mut validator = Validator::new();
        validator.require_min_len("name", &request.name, 3);
        validator.require_email("email", &request.email);
        validator.require_min_len("password", &request.password, 8);

        if validator.is_empty()
            && self.users.find_by_email(&request.email).await?.is_some()
        {
            validator.reject("email", "Email already registered");
        }
        validator.finish().map_err(AuthError::Validation)?;

        let password_hash = password::hash_password(&request.password, &self.pepper)?;
        let role = request.role.unwrap_or(Role::User);
        let user = self
            .users
            .create_user(&request.name, &request.email, &password_hash, role)
            .await?;
        debug!("user {} created with role {}", user.id, user.role);
        Ok(user)
    }

    /// Apply a partial update to a user
    ///
    /// # Errors
    ///
    /// * `AuthError::NoFieldsToUpdate` - Every updatable field was absent
    /// * `AuthError::Validation` - Malformed fields or duplicate email
    /// * `AuthError::UserNotFound` - No user with this id
    pub async fn update(&self, user_id: UserId, request: UpdateUserRequest) -> AuthResult<User> {
        if request.is_empty() {
            return Err(AuthError::NoFieldsToUpdate);
        }

        let mut validator = Validator::new();
        if let Some(name) = &request.name {
            validator.require_min_len("name", name, 3);
        }
        if let Some(email) = &request.email {
            validator.require_email("email", email);
        }
        if let Some(password) = &request.password {
            validator.require_min_len("password", password, 8);
        }

        // A changed email must not collide with another account.
        if validator.is_empty() {
            if let Some(email) = &request.email {
                if let Some(existing) = self.users.find_by_email(email).await? {
                    if existing.user.id != user_id {
                        validator.reject("email", "Email already registered");
                    }
                }
            }
        }
        validator.finish().map_err(AuthError::Validation)?;

        let password_hash = request
            .password
            .as_deref()
            .map(|p| password::hash_password(p, &self.pepper))
            .transpose()?;
        let patch = UserPatch {
            name: request.name,
            email: request.email,
            password_hash,
        };

        self.users
            .update_user(user_id, &patch)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Delete a user and return the removed record
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No user with this id
    pub async fn delete(&self, user_id: UserId) -> AuthResult<User> {
        let removed = self
            .users
            .delete_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        debug!("user {user_id} deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserRepository;

    fn manager() -> UserManager {
        UserManager::new(Arc::new(MemoryUserRepository::new()), "pepper".to_string())
    }

    fn create_request(email: &str, role: Option<Role>) -> CreateUserRequest {
        CreateUserRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "12345678".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_user_role() {
        let users = manager();
        let user = users.create(create_request("a@x.com", None)).await.unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_create_honors_admin_role() {
        let users = manager();
        let user = users
            .create(create_request("root@x.com", Some(Role::Admin)))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let users = manager();
        users.create(create_request("a@x.com", None)).await.unwrap();

        let err = users
            .create(create_request("a@x.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let users = manager();
        let user = users.create(create_request("a@x.com", None)).await.unwrap();

        let err = users
            .update(user.id, UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoFieldsToUpdate));
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let users = manager();
        let user = users.create(create_request("a@x.com", None)).await.unwrap();

        let updated = users
            .update(
                user.id,
                UpdateUserRequest {
                    name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_email_to_own_address_is_allowed() {
        let users = manager();
        let user = users.create(create_request("a@x.com", None)).await.unwrap();

        let updated = users
            .update(
                user.id,
                UpdateUserRequest {
                    email: Some("a@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_update_email_collision_rejected() {
        let users = manager();
        users.create(create_request("a@x.com", None)).await.unwrap();
        let other = users.create(create_request("b@x.com", None)).await.unwrap();

        let err = users
            .update(
                other.id,
                UpdateUserRequest {
                    email: Some("a@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let users = manager();
        let user = users.create(create_request("a@x.com", None)).await.unwrap();

        let removed = users.delete(user.id).await.unwrap();
        assert_eq!(removed.id, user.id);
        assert!(matches!(users.get(user.id).await, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let users = manager();
        let err = users.delete(42).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
