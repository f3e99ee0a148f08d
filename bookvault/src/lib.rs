//! # BookVault
//!
//! A book library backend: a catalog of books with per-record ownership,
//! fronted by JWT authentication with rotating refresh tokens.
//!
//! ## Architecture
//!
//! Managers hold the domain rules and depend only on traits, so every flow
//! can run against PostgreSQL and Redis in production or against the
//! in-memory implementations in tests:
//!
//! - [`auth`]: registration, login, token refresh with rotation, logout
//! - [`books`]: the catalog with pagination, filtering, and ownership rules
//! - [`users`]: admin-facing user management
//! - [`db`]: connection pooling and the repository traits plus their
//!   PostgreSQL and in-memory implementations
//! - [`session`]: the cache holding the single live refresh token per user
//!
//! ## Example
//!
//! ```no_run
//! use bookvault::db::{Database, DatabaseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     db.health_check().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod books;
pub mod db;
pub mod session;
pub mod users;
pub mod validation;

pub use auth::{AuthError, AuthManager, Role, TokenService};
pub use books::{BookError, BookManager};
pub use session::SessionStore;
pub use users::UserManager;
