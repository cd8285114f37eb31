//! Single-flight initialization per scope

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::cache::{Cache, CacheKeyBuilder, StorageInitializer};
use crate::domain::DomainError;

/// Serializes initialization requests per scope and drops redundant ones
///
/// A request waits for any in-flight initialization of the same scope, then
/// re-checks the population marker and only runs the inner initializer if
/// the scope is still empty. The inner initializer must populate before
/// returning for the re-check to see its work.
#[derive(Debug)]
pub struct CoalescingInitializer {
    inner: Arc<dyn StorageInitializer>,
    cache: Arc<dyn Cache>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CoalescingInitializer {
    pub fn new(inner: Arc<dyn StorageInitializer>, cache: Arc<dyn Cache>) -> Self {
        Self {
            inner,
            cache,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn scope_lock(&self, scope: &CacheKeyBuilder) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(scope.prefix())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl StorageInitializer for CoalescingInitializer {
    async fn request_initialization(&self, scope: &CacheKeyBuilder) -> Result<bool, DomainError> {
        let lock = self.scope_lock(scope).await;
        let _flight = lock.lock().await;

        if self.cache.exists(&scope.populated_key()).await? {
            tracing::debug!(store = %scope, "Scope already populated, request coalesced");
            return Ok(false);
        }

        self.inner.request_initialization(scope).await
    }
}
