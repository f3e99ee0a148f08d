//! Book library HTTP server.
//!
//! Connects PostgreSQL for durable records and Redis for the session cache,
//! then serves the REST API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use bookvault::{
    auth::{AuthManager, TokenService},
    books::BookManager,
    db::{Database, PgBookRepository, PgUserRepository},
    session::RedisSessionStore,
    users::UserManager,
};
use bv_server::{api, config::ServerConfig, logging, metrics};
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the book library server

USAGE:
  bv_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/bookvault_db]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  REDIS_HOST               Session cache host
  REDIS_PORT               Session cache port
  ACCESS_TOKEN_SECRET      Access token signing secret (required)
  REFRESH_TOKEN_SECRET     Refresh token signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  METRICS_BIND             Prometheus exporter address (optional)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)?;
    info!("Starting book library server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{metrics_bind}/metrics");
    }

    info!("Connecting to database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    info!("Database connected successfully");

    db.run_migrations()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database schema is up to date");

    let cache_url = config.cache.url();
    info!("Connecting to session cache: {cache_url}");
    let sessions = Arc::new(
        RedisSessionStore::connect(&cache_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to session cache: {}", e))?,
    );
    info!("Session cache connected successfully");

    // Create managers
    let pool = Arc::new(db.pool().clone());
    let users = Arc::new(PgUserRepository::new(db.pool().clone()));
    let books = Arc::new(PgBookRepository::new(db.pool().clone()));

    let tokens = TokenService::new(
        config.security.access_token_secret.clone(),
        config.security.refresh_token_secret.clone(),
    );
    let auth_manager = Arc::new(AuthManager::new(
        users.clone(),
        sessions.clone(),
        tokens,
        config.security.password_pepper.clone(),
    ));
    let book_manager = Arc::new(BookManager::new(books));
    let user_manager = Arc::new(UserManager::new(
        users,
        config.security.password_pepper.clone(),
    ));

    let api_state = api::AppState {
        auth_manager,
        book_manager,
        user_manager,
        sessions,
        pool: Some(pool),
    };

    let app = api::create_router(api_state);

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
