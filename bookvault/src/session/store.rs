//! Session store implementations.

use super::refresh_token_key;
use crate::auth::UserId;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Session cache errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Cache backend error
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),
}

/// Result type for session cache operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Key-value store with expiry for the active refresh token per user.
///
/// `put` must atomically overwrite any prior entry for the user; that
/// overwrite is what retires the previous refresh token. `delete` is
/// idempotent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store the refresh token for a user, replacing any prior entry.
    async fn put(&self, user_id: UserId, refresh_token: &str, ttl: Duration) -> SessionResult<()>;

    /// Fetch the currently stored refresh token for a user.
    async fn get(&self, user_id: UserId) -> SessionResult<Option<String>>;

    /// Drop the entry for a user. Deleting an absent key is not an error.
    async fn delete(&self, user_id: UserId) -> SessionResult<()>;

    /// Health probe for the backing store.
    async fn ping(&self) -> SessionResult<()>;
}

/// Redis-backed session store. A single SET with EX per `put` gives the
/// atomic-overwrite semantics the rotation relies on.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect to redis at the given URL (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> SessionResult<Self> {
        let client = redis::Client::open(url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self { redis })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, user_id: UserId, refresh_token: &str, ttl: Duration) -> SessionResult<()> {
        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(refresh_token_key(user_id), refresh_token, ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> SessionResult<Option<String>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(refresh_token_key(user_id)).await?;
        Ok(value)
    }

    async fn delete(&self, user_id: UserId) -> SessionResult<()> {
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(refresh_token_key(user_id)).await?;
        Ok(())
    }

    async fn ping(&self) -> SessionResult<()> {
        let mut conn = self.redis.clone();
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}

/// In-memory session store with per-entry deadlines.
///
/// Honors the same TTL contract as the redis store; expired entries are
/// dropped lazily on read. Used by tests and single-process deployments that
/// run without a cache server.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<UserId, (String, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, user_id: UserId, refresh_token: &str, ttl: Duration) -> SessionResult<()> {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .unwrap()
            .insert(user_id, (refresh_token.to_string(), deadline));
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> SessionResult<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&user_id) {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                entries.remove(&user_id);
                Ok(None)
            }
            Some((token, _)) => Ok(Some(token.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: UserId) -> SessionResult<()> {
        self.entries.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn ping(&self) -> SessionResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemorySessionStore::new();
        store.put(1, "token-a", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), Some("token-a".to_string()));
    }

    #[tokio::test]
    async fn test_put_overwrites_prior_entry() {
        let store = MemorySessionStore::new();
        store.put(1, "token-a", Duration::from_secs(60)).await.unwrap();
        store.put(1, "token-b", Duration::from_secs(60)).await.unwrap();

        // The old token is unrecoverable after rotation.
        assert_eq!(store.get(1).await.unwrap(), Some("token-b".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let store = MemorySessionStore::new();
        store.put(1, "token-a", Duration::ZERO).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemorySessionStore::new();
        store.put(1, "token-a", Duration::from_secs(60)).await.unwrap();

        store.delete(1).await.unwrap();
        assert_eq!(store.get(1).await.unwrap(), None);

        // Deleting an absent key is fine.
        store.delete(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_entries_are_per_user() {
        let store = MemorySessionStore::new();
        store.put(1, "token-a", Duration::from_secs(60)).await.unwrap();
        store.put(2, "token-b", Duration::from_secs(60)).await.unwrap();

        store.delete(1).await.unwrap();
        assert_eq!(store.get(2).await.unwrap(), Some("token-b".to_string()));
    }
}
