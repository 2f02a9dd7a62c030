//! Cache store backends: in-process (moka) and shared (Redis).
//!
//! Values are opaque strings; per-key expiry is optional. Deleting a key
//! that does not exist is a no-op, never an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache connection failed: {0}")]
    Connection(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Atomically replaces the value under `key`. `ttl = None` keeps the
    /// entry until it is invalidated.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

pub type DynCacheStore = Arc<dyn CacheStore>;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
}

struct PerEntryExpiry;

impl moka::Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// Process-local backend. Entry lifetime is controlled per key through the
/// expiry policy rather than a cache-wide TTL.
pub struct MemoryCacheStore {
    cache: moka::sync::Cache<String, Entry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            cache: moka::sync::Cache::builder()
                .max_capacity(64 * 1024 * 1024)
                .weigher(|key: &String, entry: &Entry| {
                    (key.len() + entry.value.len()).try_into().unwrap_or(u32::MAX)
                })
                .expire_after(PerEntryExpiry)
                .build(),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), Entry { value, ttl });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key);
        Ok(())
    }
}

/// Shared backend over a Redis instance, using native `EXPIRE` for TTLs.
pub struct RedisCacheStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let result: Result<(), redis::RedisError> = match ttl {
            Some(ttl) => conn.set_ex(key, value, ttl.as_secs()).await,
            None => conn.set(key, value).await,
        };
        result.map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: u64 = conn
            .del(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_roundtrip() {
        let store = MemoryCacheStore::new();

        store
            .set("greeting", "hello".to_string(), None)
            .await
            .unwrap();
        assert_eq!(
            store.get("greeting").await.unwrap(),
            Some("hello".to_string())
        );

        store.delete("greeting").await.unwrap();
        assert_eq!(store.get("greeting").await.unwrap(), None);
    }

    #[tokio::test]
    async fn deleting_a_missing_key_is_a_noop() {
        let store = MemoryCacheStore::new();
        store.delete("never-set").await.unwrap();
    }

    #[tokio::test]
    async fn set_replaces_the_whole_value() {
        let store = MemoryCacheStore::new();

        store.set("doc", "v1".to_string(), None).await.unwrap();
        store.set("doc", "v2".to_string(), None).await.unwrap();

        assert_eq!(store.get("doc").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn ttl_expires_the_entry() {
        let store = MemoryCacheStore::new();

        store
            .set(
                "ephemeral",
                "x".to_string(),
                Some(Duration::from_millis(50)),
            )
            .await
            .unwrap();
        assert!(store.get("ephemeral").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.get("ephemeral").await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_without_ttl_do_not_expire() {
        let store = MemoryCacheStore::new();

        store.set("durable", "x".to_string(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(store.get("durable").await.unwrap().is_some());
    }
}
