use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache miss: {0}")]
    Miss(String),
}

/// Single-tier in-process cache
///
/// Values are stored serialized so heterogeneous response types can share one
/// cache without generic plumbing. Entries expire on a fixed TTL; there is no
/// shared tier, so every instance warms its own copy.
pub struct LocalCache {
    entries: moka::future::Cache<String, Vec<u8>>,
}

impl LocalCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { entries }
    }

    /// Get a value from the cache
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned,
    {
        match self.entries.get(key).await {
            Some(bytes) => {
                tracing::trace!("Cache hit: {}", key);
                Ok(serde_json::from_slice(&bytes)?)
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Err(CacheError::Miss(key.to_string()))
            }
        }
    }

    /// Set a value in the cache
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.entries.insert(key.to_string(), bytes).await;
        Ok(())
    }

    /// Drop a cached value
    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for the category collection
    pub fn categories() -> String {
        "categories".to_string()
    }
}
