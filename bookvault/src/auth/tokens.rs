//! JWT token service.
//!
//! Issues and verifies the two token kinds used by the auth flow: short-lived
//! access tokens and long-lived refresh tokens, each signed with its own
//! secret. Verification distinguishes expiry from any other defect because the
//! two map to different HTTP outcomes.

use super::errors::{AuthError, AuthResult};
use super::models::{Role, TokenClaims, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Stateless token issuer/verifier. Secrets are injected once at construction;
/// there is no global secret state.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl TokenService {
    /// Create a token service with the standard lifetimes: 15-minute access
    /// tokens and 7-day refresh tokens.
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self::with_durations(
            access_secret,
            refresh_secret,
            Duration::minutes(15),
            Duration::days(7),
        )
    }

    /// Create a token service with explicit lifetimes. Mostly useful in tests
    /// that need already-expired tokens.
    pub fn with_durations(
        access_secret: String,
        refresh_secret: String,
        access_token_duration: Duration,
        refresh_token_duration: Duration,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_token_duration,
            refresh_token_duration,
        }
    }

    /// Refresh-token lifetime in whole seconds, used as the session cache TTL
    /// so the cache entry dies together with the token.
    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_token_duration.num_seconds().max(0) as u64
    }

    /// Issue a short-lived access token carrying `{userId, role}`.
    pub fn issue_access_token(&self, user_id: UserId, role: Role) -> AuthResult<String> {
        self.issue(user_id, role, self.access_token_duration, &self.access_secret)
    }

    /// Issue a long-lived refresh token carrying `{userId, role}`, signed with
    /// the distinct refresh secret.
    pub fn issue_refresh_token(&self, user_id: UserId, role: Role) -> AuthResult<String> {
        self.issue(
            user_id,
            role,
            self.refresh_token_duration,
            &self.refresh_secret,
        )
    }

    /// Verify an access token.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        Self::verify(token, &self.access_secret)
    }

    /// Verify a refresh token. This only checks signature and expiry; the
    /// session cache decides whether the token is still the live one.
    pub fn verify_refresh_token(&self, token: &str) -> AuthResult<TokenClaims> {
        Self::verify(token, &self.refresh_secret)
    }

    fn issue(
        &self,
        user_id: UserId,
        role: Role,
        duration: Duration,
        secret: &str,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id,
            role,
            exp: (now + duration).timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn verify(token: &str, secret: &str) -> AuthResult<TokenClaims> {
        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

        Ok(token_data.claims)
    }
}
