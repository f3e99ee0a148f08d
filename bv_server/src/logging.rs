//! Structured logging configuration.
//!
//! Provides structured logging with request correlation and security event
//! tracking.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var; noisy
/// dependencies are capped at `warn` by default.
///
/// # Example
///
/// ```no_run
/// use bv_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use bv_server::logging::log_security_event;
///
/// log_security_event(
///     "failed_login",
///     Some("192.168.1.1"),
///     "Invalid password attempt",
/// );
/// ```
pub fn log_security_event(event_type: &str, client: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        client = client,
        "SECURITY: {}",
        message
    );
}
