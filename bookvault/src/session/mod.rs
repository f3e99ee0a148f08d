//! Session cache holding the single active refresh token per user.
//!
//! The cache, not the token's own expiry claim, is the authority for
//! refresh-token liveness: a cryptographically valid token that is absent from
//! the cache (or differs from the stored value) is dead. Overwriting the entry
//! is the rotation point, and the entry's TTL doubles as passive expiry.

pub mod config;
pub mod store;

pub use config::CacheConfig;
pub use store::{MemorySessionStore, RedisSessionStore, SessionError, SessionResult, SessionStore};

/// Cache key for the active refresh token of one user.
pub fn refresh_token_key(user_id: i64) -> String {
    format!("auth:refresh:user:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_key_pattern() {
        assert_eq!(refresh_token_key(42), "auth:refresh:user:42");
    }
}
