//! Rate limiting for the HTTP API.
//!
//! Caps the number of requests a client can send within a time window using a
//! sliding-window algorithm, tracked per client address.

use axum::{extract::Request, middleware::Next, response::Response};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::error::ApiError;
use crate::{logging, metrics};

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Maximum number of requests allowed in the time window
    /// * `window` - Time window duration
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit
    /// exceeded.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        self.prune(now);

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Remove timestamps outside the window
    fn prune(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Whether the window holds no live requests.
    fn is_idle(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.timestamps.is_empty()
    }

    /// Get the number of requests in the current window
    pub fn current_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Get the number of remaining requests allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

/// Per-client rate limiting state shared across requests.
///
/// Defaults to 100 requests per 15 minutes per client. Clients whose window
/// has emptied are evicted at most once per window, so the map stays bounded
/// by the number of clients active in the last window.
#[derive(Debug, Clone)]
pub struct ClientRateLimiter {
    clients: Arc<Mutex<ClientTable>>,
    max_requests: usize,
    window: Duration,
}

#[derive(Debug)]
struct ClientTable {
    map: HashMap<String, RateLimiter>,
    last_sweep: Instant,
}

impl Default for ClientRateLimiter {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(15 * 60))
    }
}

impl ClientRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            clients: Arc::new(Mutex::new(ClientTable {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_requests,
            window,
        }
    }

    /// Check whether a request from `client` is allowed.
    pub fn check(&self, client: &str) -> bool {
        let mut clients = self.clients.lock().unwrap();
        let now = Instant::now();

        if now.duration_since(clients.last_sweep) >= self.window {
            clients.map.retain(|_, limiter| !limiter.is_idle(now));
            clients.last_sweep = now;
        }

        clients
            .map
            .entry(client.to_string())
            .or_insert_with(|| RateLimiter::new(self.max_requests, self.window))
            .check()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().unwrap().map.len()
    }
}

/// Client key for rate limiting: the forwarded address when behind a proxy,
/// otherwise a shared bucket.
fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware rejecting clients over their request budget with `429`.
pub async fn rate_limit_middleware(
    limiter: ClientRateLimiter,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_key(&request);
    if !limiter.check(&client) {
        metrics::rate_limit_hits_total();
        logging::log_security_event("rate_limited", Some(&client), "Request budget exhausted");
        return Err(ApiError::too_many_requests());
    }
    Ok(next.run(request).await)
}
