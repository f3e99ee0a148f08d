//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{LoginRequest, RegisterRequest, Role, SessionTokens, TokenClaims, User, UserId},
    password,
    tokens::TokenService,
};
use crate::db::UserRepository;
use crate::session::SessionStore;
use crate::validation::Validator;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates register/login/refresh/logout across the credential store, the
/// token service, and the session cache.
///
/// Session lifecycle per user: Anonymous → Authenticated → (Refreshed)* →
/// LoggedOut. Exactly one refresh token is live at a time; every successful
/// refresh rotates it.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    tokens: TokenService,
    pepper: String,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Credential store
    /// * `sessions` - Session cache holding the active refresh token per user
    /// * `tokens` - Token service with the access/refresh signing secrets
    /// * `pepper` - Server-side pepper for password hashing
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        tokens: TokenService,
        pepper: String,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            pepper,
        }
    }

    /// Register a new user
    ///
    /// Validates the payload, rejects duplicate emails, hashes the password,
    /// and stores the user with role fixed to `USER`. The returned user never
    /// carries the password.
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Malformed fields or duplicate email
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let mut validator = Validator::new();
        validator.require_min_len("name", &request.name, 3);
        validator.require_email("email", &request.email);
        validator.require_min_len("password", &request.password, 8);

        // Only probe the store once the shape checks passed, mirroring the
        // field-level error format for duplicates.
        if validator.is_empty()
            && self.users.find_by_email(&request.email).await?.is_some()
        {
            validator.reject("email", "Email already registered");
        }
        validator.finish().map_err(AuthError::Validation)?;

        let password_hash = password::hash_password(&request.password, &self.pepper)?;
        let user = self
            .users
            .create_user(&request.name, &request.email, &password_hash, Role::User)
            .await?;

        Ok(user)
    }

    /// Login a user
    ///
    /// On success issues one access token and one refresh token and stores the
    /// refresh token in the session cache under the user's id (Anonymous →
    /// Authenticated).
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password;
    ///   deliberately undifferentiated
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let credentials = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        password::verify_password(&request.password, &self.pepper, &credentials.password_hash)?;

        let user = credentials.user;
        let tokens = self.create_session(user.id, user.role).await?;

        Ok((user, tokens))
    }

    /// Refresh the session using a refresh token
    ///
    /// Verifies the token against the refresh secret, then checks it against
    /// the session cache: the stored value must exactly equal the presented
    /// token, otherwise the token was rotated out or never existed. On success
    /// both tokens are reissued and the cache entry is overwritten (rotation).
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenExpired` - Refresh token past its expiry
    /// * `AuthError::TokenInvalid` - Bad signature, or stale token superseded
    ///   by a later refresh or logout (anti-replay)
    /// * `AuthError::TokenNotFound` - No live session for this user
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<SessionTokens> {
        let claims = self.tokens.verify_refresh_token(refresh_token)?;

        let stored = self
            .sessions
            .get(claims.sub)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if stored != refresh_token {
            // A token that verifies but mismatches the cache was rotated out;
            // replaying it must fail even though its signature is fresh.
            debug!("stale refresh token presented for user {}", claims.sub);
            return Err(AuthError::TokenInvalid);
        }

        let tokens = self.create_session(claims.sub, claims.role).await?;
        Ok(tokens)
    }

    /// Logout a user by dropping their session cache entry
    ///
    /// Idempotent: logging out twice, or with no live session, is not an
    /// error. The current access token keeps verifying until it expires on its
    /// own; only the refresh path dies immediately.
    pub async fn logout(&self, user_id: UserId) -> AuthResult<()> {
        self.sessions.delete(user_id).await?;
        debug!("session cleared for user {user_id}");
        Ok(())
    }

    /// Verify an access token
    ///
    /// Used by the route guard; pure token-service passthrough.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        self.tokens.verify_access_token(token)
    }

    /// Issue both tokens and store the refresh token with a TTL matching its
    /// lifetime. The cache overwrite is the rotation point.
    async fn create_session(&self, user_id: UserId, role: Role) -> AuthResult<SessionTokens> {
        let access_token = self.tokens.issue_access_token(user_id, role)?;
        let refresh_token = self.tokens.issue_refresh_token(user_id, role)?;

        self.sessions
            .put(
                user_id,
                &refresh_token,
                Duration::from_secs(self.tokens.refresh_ttl_secs()),
            )
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserRepository;
    use crate::session::MemorySessionStore;

    fn manager() -> (AuthManager, Arc<MemorySessionStore>) {
        let users = Arc::new(MemoryUserRepository::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let tokens = TokenService::new(
            "access_secret_for_testing_only_32ch".to_string(),
            "refresh_secret_for_testing_only_32c".to_string(),
        );
        (
            AuthManager::new(users, sessions.clone(), tokens, "pepper".to_string()),
            sessions,
        )
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password: "12345678".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_fixes_role_to_user() {
        let (auth, _) = manager();
        let user = auth.register(register_request()).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let (auth, _) = manager();
        auth.register(register_request()).await.unwrap();

        let err = auth.register(register_request()).await.unwrap_err();
        match err {
            AuthError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "email");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_collects_field_errors() {
        let (auth, _) = manager();
        let err = auth
            .register(RegisterRequest {
                name: "ab".to_string(),
                email: "nope".to_string(),
                password: "short".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            AuthError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_stores_refresh_token_in_cache() {
        let (auth, sessions) = manager();
        let user = auth.register(register_request()).await.unwrap();

        let (_, tokens) = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "12345678".to_string(),
            })
            .await
            .unwrap();

        let stored = sessions.get(user.id).await.unwrap();
        assert_eq!(stored, Some(tokens.refresh_token));
    }

    #[tokio::test]
    async fn test_login_failure_is_undifferentiated() {
        let (auth, _) = manager();
        auth.register(register_request()).await.unwrap();

        let unknown_email = auth
            .login(LoginRequest {
                email: "b@x.com".to_string(),
                password: "12345678".to_string(),
            })
            .await
            .unwrap_err();
        let wrong_password = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "wrongpass".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            unknown_email.client_message(),
            wrong_password.client_message()
        );
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let (auth, sessions) = manager();
        let user = auth.register(register_request()).await.unwrap();
        let (_, first) = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "12345678".to_string(),
            })
            .await
            .unwrap();

        let second = auth.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        // The cache now holds the rotated token.
        let stored = sessions.get(user.id).await.unwrap();
        assert_eq!(stored, Some(second.refresh_token.clone()));

        // Replaying the superseded token fails although its signature is
        // still cryptographically valid.
        let err = auth.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));

        // The rotated-in token keeps working (Refreshed → Refreshed).
        auth.refresh(&second.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_after_logout_fails() {
        let (auth, sessions) = manager();
        let user = auth.register(register_request()).await.unwrap();
        let (_, tokens) = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "12345678".to_string(),
            })
            .await
            .unwrap();

        auth.logout(user.id).await.unwrap();
        assert_eq!(sessions.get(user.id).await.unwrap(), None);

        let err = auth.refresh(&tokens.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenNotFound));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (auth, _) = manager();
        let user = auth.register(register_request()).await.unwrap();

        auth.logout(user.id).await.unwrap();
        auth.logout(user.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_with_garbage_token() {
        let (auth, _) = manager();
        let err = auth.refresh("not.a.jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn test_access_token_round_trip_through_manager() {
        let (auth, _) = manager();
        auth.register(register_request()).await.unwrap();
        let (user, tokens) = auth
            .login(LoginRequest {
                email: "a@x.com".to_string(),
                password: "12345678".to_string(),
            })
            .await
            .unwrap();

        let claims = auth.verify_access_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::User);
    }
}
