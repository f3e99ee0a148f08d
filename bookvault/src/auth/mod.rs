//! Authentication module providing user registration, login, and session management.
//!
//! This module implements secure authentication with:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (15-minute expiry)
//! - Rotating refresh tokens (7-day expiry), with the session cache as the
//!   single source of truth for which refresh token is live
//!
//! ## Example
//!
//! ```no_run
//! use bookvault::auth::{AuthManager, RegisterRequest, TokenService};
//! use bookvault::db::MemoryUserRepository;
//! use bookvault::session::MemorySessionStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryUserRepository::new()),
//!         Arc::new(MemorySessionStore::new()),
//!         TokenService::new(
//!             "access_secret_at_least_32_characters".to_string(),
//!             "refresh_secret_at_least_32_character".to_string(),
//!         ),
//!         "secret_pepper".to_string(),
//!     );
//!
//!     let user = auth
//!         .register(RegisterRequest {
//!             name: "Reader One".to_string(),
//!             email: "reader@example.com".to_string(),
//!             password: "SecurePass123".to_string(),
//!         })
//!         .await?;
//!     println!("Registered user: {}", user.email);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod tokens;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    LoginRequest, RegisterRequest, Role, SessionTokens, TokenClaims, User, UserCredentials, UserId,
};
pub use tokens::TokenService;
