//! In-memory cache store using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::{Cache, CacheParams};
use crate::domain::DomainError;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound on the lifetime of any entry
    pub max_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            max_ttl: Duration::from_secs(3600),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    /// Expiration timestamp (millis since epoch)
    expires_at: u64,
}

/// Thread-safe in-memory cache store
///
/// Per-entry TTLs are tracked next to the value; moka's own TTL only caps
/// how long anything can live.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.max_ttl)
            .build();

        Self { cache }
    }

    fn current_time_millis() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn expiry(ttl: Duration) -> u64 {
        Self::current_time_millis() + ttl.as_millis() as u64
    }

    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.cache.get(key).await?;

        if Self::current_time_millis() > entry.expires_at {
            self.cache.remove(key).await;
            return None;
        }

        Some(entry)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(
        &self,
        key: &str,
        params: &CacheParams,
    ) -> Result<Option<String>, DomainError> {
        let Some(entry) = self.live_entry(key).await else {
            return Ok(None);
        };

        if params.refreshes_ttl() {
            let refreshed = CacheEntry {
                data: entry.data.clone(),
                expires_at: Self::expiry(params.ttl),
            };
            self.cache.insert(key.to_string(), refreshed).await;
        }

        Ok(Some(entry.data))
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        params: &CacheParams,
    ) -> Result<(), DomainError> {
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: Self::expiry(params.ttl),
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.live_entry(key).await.is_some())
    }
}
