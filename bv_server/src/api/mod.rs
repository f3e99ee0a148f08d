//! HTTP API for the book library server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **Tower**: CORS middleware
//! - **JWT**: Token-based authentication with access/refresh tokens
//!
//! # Modules
//!
//! - [`auth`]: Session lifecycle (register, login, refresh, logout)
//! - [`books`]: Book catalog CRUD with pagination and filtering
//! - [`users`]: Admin-only user management
//! - [`middleware`]: Authentication and admin-authorization middleware
//! - [`rate_limiter`]: Per-client request budget
//! - [`request_id`]: Request correlation and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                  - Health check (public, not rate limited)
//! POST   /auth/register           - Register user (public)
//! POST   /auth/login              - Login (public)
//! POST   /auth/refresh-token      - Rotate tokens (public, takes refresh token)
//! POST   /auth/logout             - Logout (auth required)
//! GET    /books                   - List books (public)
//! GET    /books/{id}              - Get book (public)
//! POST   /books                   - Create book (auth required)
//! PUT    /books/{id}              - Update book (owner or admin)
//! DELETE /books/{id}              - Delete book (admin only)
//! GET    /users                   - List users (public)
//! GET    /users/{id}              - Get user (public)
//! POST   /users                   - Create user (admin only)
//! PUT    /users/{id}              - Update user (admin only)
//! DELETE /users/{id}              - Delete user (admin only)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bv_server::api::{AppState, create_router};
//! use bookvault::auth::{AuthManager, TokenService};
//! use bookvault::books::BookManager;
//! use bookvault::db::{MemoryBookRepository, MemoryUserRepository};
//! use bookvault::session::MemorySessionStore;
//! use bookvault::users::UserManager;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let users = Arc::new(MemoryUserRepository::new());
//! let books = Arc::new(MemoryBookRepository::new());
//! let sessions = Arc::new(MemorySessionStore::new());
//! let tokens = TokenService::new(
//!     "access_secret_at_least_32_characters".to_string(),
//!     "refresh_secret_at_least_32_character".to_string(),
//! );
//! let pepper = "secret_pepper_16ch".to_string();
//!
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(
//!         users.clone(),
//!         sessions.clone(),
//!         tokens,
//!         pepper.clone(),
//!     )),
//!     book_manager: Arc::new(BookManager::new(books)),
//!     user_manager: Arc::new(UserManager::new(users, pepper)),
//!     sessions,
//!     pool: None,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod books;
pub mod error;
pub mod middleware;
pub mod rate_limiter;
pub mod request_id;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use bookvault::auth::AuthManager;
use bookvault::books::BookManager;
use bookvault::session::SessionStore;
use bookvault::users::UserManager;
use rate_limiter::ClientRateLimiter;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to Arc wrappers).
///
/// # Fields
///
/// - `auth_manager`: Session lifecycle and token verification
/// - `book_manager`: Book catalog rules
/// - `user_manager`: Admin user management
/// - `sessions`: Session cache handle, used by the health check
/// - `pool`: Database pool for the health check; `None` when running on the
///   in-memory repositories
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub book_manager: Arc<BookManager>,
    pub user_manager: Arc<UserManager>,
    pub sessions: Arc<dyn SessionStore>,
    pub pool: Option<Arc<PgPool>>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// Middleware layers, outermost first: CORS, request-id/metrics, then the
/// per-client rate limiter on the API routes, then per-route authentication
/// and authorization. The health check sits outside the rate limiter so
/// monitoring probes never get throttled.
pub fn create_router(state: AppState) -> Router {
    let limiter = ClientRateLimiter::default();

    let api_routes = create_api_router(state.clone()).layer(axum::middleware::from_fn(
        move |request: axum::extract::Request, next: axum::middleware::Next| {
            rate_limiter::rate_limit_middleware(limiter.clone(), request, next)
        },
    ));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Assemble the API routes with their authentication layers.
fn create_api_router(state: AppState) -> Router<AppState> {
    // Public routes: no access token involved. Refresh authenticates with the
    // refresh token in the body instead of the Authorization header, and the
    // catalog and user reads are open.
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh-token", post(auth::refresh))
        .route("/books", get(books::list_books))
        .route("/books/{book_id}", get(books::get_book))
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", get(users::get_user));

    // Admin-only routes; require_admin runs after authenticate.
    let admin_routes = Router::new()
        .route("/users", post(users::create_user))
        .route(
            "/users/{user_id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/books/{book_id}", delete(books::delete_book))
        .route_layer(axum::middleware::from_fn(middleware::require_admin));

    // Everything below requires a valid access token.
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/books", post(books::create_book))
        .route("/books/{book_id}", put(books::update_book))
        .merge(admin_routes)
        // route_layer keeps the guard off the fallback, so unknown paths
        // still produce 404 instead of 401.
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::authenticate,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes the database pool (when one is configured) and the session cache.
/// Returns `200 OK` when every component is healthy, `503 Service
/// Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","database":true,"cache":true,"timestamp":"2026-08-30T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.pool {
        Some(pool) => sqlx::query("SELECT 1").execute(&**pool).await.is_ok(),
        None => true,
    };
    let cache_healthy = state.sessions.ping().await.is_ok();

    let overall_healthy = db_healthy && cache_healthy;
    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if overall_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "cache": cache_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
