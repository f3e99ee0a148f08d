//! Session cache configuration.

use std::env;

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis host
    pub host: String,

    /// Redis port
    pub port: u16,
}

impl CacheConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `REDIS_HOST`: Redis host (default: localhost)
    /// - `REDIS_PORT`: Redis port (default: 6379)
    pub fn from_env() -> Self {
        Self {
            host: env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6379),
        }
    }

    /// Connection URL for the redis client
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_format() {
        let config = CacheConfig {
            host: "cache.internal".to_string(),
            port: 6380,
        };
        assert_eq!(config.url(), "redis://cache.internal:6380");
    }
}
