//! Cache store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

use super::params::CacheParams;

/// Key-value cache store
///
/// This trait uses JSON strings internally to be dyn-compatible.
/// Use the helper methods for typed get/set operations.
///
/// Reads and writes carry the scope's parameter bag as configured. Stores
/// apply its TTL and act on the hints they understand.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache
    async fn get_raw(
        &self,
        key: &str,
        params: &CacheParams,
    ) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value for `params.ttl`, replacing any previous value
    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        params: &CacheParams,
    ) -> Result<(), DomainError>;

    /// Checks if a key exists in the cache
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key, &CacheParams::default()).await?.is_some())
    }
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
        params: &'a CacheParams,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key, params).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        params: &'a CacheParams,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, params).await
        }
    }

    /// Gets multiple values at once, in key order
    fn get_many<'a, V>(
        &'a self,
        keys: &'a [String],
        params: &'a CacheParams,
    ) -> impl std::future::Future<Output = Result<Vec<Option<V>>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            let mut results = Vec::with_capacity(keys.len());

            for key in keys {
                results.push(self.get(key, params).await?);
            }

            Ok(results)
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
