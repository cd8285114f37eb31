//! Cache factory for runtime store selection

use std::sync::Arc;
use std::time::Duration;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache store types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheType {
    /// In-memory store using moka
    #[default]
    InMemory,
    /// Redis store
    Redis,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CacheType::InMemory),
            "redis" => Ok(CacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown cache type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the cache factory
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub cache_type: CacheType,
    /// Redis URL (required for Redis type)
    pub redis_url: Option<String>,
    /// Key prefix for sharing a Redis database
    pub key_prefix: Option<String>,
    /// Upper bound on entry lifetime (in-memory only)
    pub max_ttl: Duration,
    /// Maximum capacity (in-memory only)
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            max_ttl: Duration::from_secs(24 * 3600),
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            cache_type: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Factory for creating cache stores
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache store based on configuration
    pub async fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.cache_type {
            CacheType::InMemory => {
                let in_memory_config = InMemoryCacheConfig::default()
                    .with_max_capacity(config.max_capacity)
                    .with_max_ttl(config.max_ttl);

                Ok(Arc::new(InMemoryCache::with_config(in_memory_config)))
            }
            CacheType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for Redis cache type")
                })?;

                let mut redis_config = RedisCacheConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                Ok(Arc::new(RedisCache::new(redis_config).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheExt, CacheParams};

    #[test]
    fn test_cache_type_from_str() {
        assert_eq!("in_memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("memory".parse::<CacheType>().unwrap(), CacheType::InMemory);
        assert_eq!("REDIS".parse::<CacheType>().unwrap(), CacheType::Redis);
        assert!("memcached".parse::<CacheType>().is_err());
    }

    #[test]
    fn test_cache_config_redis() {
        let config = CacheConfig::redis("redis://localhost:6379").with_key_prefix("myapp");

        assert_eq!(config.cache_type, CacheType::Redis);
        assert_eq!(config.redis_url, Some("redis://localhost:6379".to_string()));
        assert_eq!(config.key_prefix, Some("myapp".to_string()));
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let cache = CacheFactory::new()
            .create(&CacheConfig::in_memory().with_max_capacity(100))
            .await
            .unwrap();

        let params = CacheParams::default();
        cache.set("test", &"value", &params).await.unwrap();

        let result: Option<String> = cache.get("test", &params).await.unwrap();
        assert_eq!(result, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_factory_create_redis_missing_url() {
        let config = CacheConfig {
            cache_type: CacheType::Redis,
            ..Default::default()
        };

        let result = CacheFactory::new().create(&config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
