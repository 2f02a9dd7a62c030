//! Cache-aside layer: pluggable key/value backends holding whole-document
//! JSON snapshots, a read-through helper, and the invalidation registry.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

pub mod invalidation;
pub mod keys;
pub mod store;

pub use invalidation::EntityMutation;
pub use store::{CacheError, CacheStore, DynCacheStore, MemoryCacheStore, RedisCacheStore};

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        tracing::error!("Cache error: {:?}", err);
        ApiError::internal("Internal Server Error")
    }
}

/// Cache-aside read path: return the deserialized hit, or run `compute`
/// against the source of truth, store the serialized result under `key`
/// (with an optional TTL) and return it.
///
/// Entries are whole-document JSON blobs replaced atomically by the store's
/// set operation; an undeserializable entry is treated as a miss.
pub async fn cached<T, F, Fut>(
    store: &DynCacheStore,
    key: &str,
    ttl: Option<Duration>,
    compute: F,
) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if let Some(hit) = store.get(key).await? {
        match serde_json::from_str(&hit) {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                return Ok(value);
            }
            Err(err) => {
                tracing::warn!(key, "discarding undeserializable cache entry: {}", err);
                store.delete(key).await?;
            }
        }
    }

    let value = compute().await?;
    let payload = serde_json::to_string(&value)?;
    store.set(key, payload, ttl).await?;
    Ok(value)
}
