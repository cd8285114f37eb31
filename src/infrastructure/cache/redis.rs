//! Redis cache store

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::{Cache, CacheParams};
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix prepended to every scope key
    pub key_prefix: Option<String>,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    fn prefixed(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

/// Redis-backed cache store
///
/// Values are written with `SET EX`, so every write replaces the whole
/// value. Reads with the `refresh_ttl` hint use `GETEX` to restart the TTL.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!(url = %config.url, "Connected to Redis cache");

        Ok(Self { connection, config })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(
        &self,
        key: &str,
        params: &CacheParams,
    ) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();
        let prefixed = self.config.prefixed(key);

        let value: redis::RedisResult<Option<String>> = if params.refreshes_ttl() {
            redis::cmd("GETEX")
                .arg(&prefixed)
                .arg("EX")
                .arg(ttl_secs(params))
                .query_async(&mut conn)
                .await
        } else {
            conn.get(&prefixed).await
        };

        value.map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        params: &CacheParams,
    ) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        conn.set_ex::<_, _, ()>(self.config.prefixed(key), value, ttl_secs(params))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        conn.exists(self.config.prefixed(key)).await.map_err(|e| {
            DomainError::cache(format!("Failed to check existence of key '{}': {}", key, e))
        })
    }
}

/// Redis expiries are whole seconds; anything shorter rounds up to one
fn ttl_secs(params: &CacheParams) -> u64 {
    params.ttl.as_secs().max(1)
}
