//! Admin-facing user management.

pub mod manager;
pub mod models;

pub use manager::UserManager;
pub use models::{CreateUserRequest, UpdateUserRequest, UserPatch};
