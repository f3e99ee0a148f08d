//! HTTP server for the book library backend.
//!
//! Wires the domain managers from `bookvault` into an Axum application:
//! JWT-authenticated routes for the book catalog, admin user management, and
//! the session lifecycle with rotating refresh tokens.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
