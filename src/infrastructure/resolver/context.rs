//! Collaborators shared by every resolver of a scope

use std::collections::HashSet;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::cache::{Cache, CacheExt, CacheKeyBuilder, StorageInitializer};
use crate::domain::record::{
    AttributePredicate, Record, RecordQuery, RecordRepository, RecordService,
};
use crate::domain::resolver::ScopeConfig;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_initialization_request;

/// Scope configuration plus the collaborators a resolver may need
///
/// Collaborators are optional so that a resolver can be built with only
/// what its strategy uses; asking for a missing one is a
/// `MissingCollaborator` error. The initializer is the exception: without
/// one, initialization requests are simply not sent.
#[derive(Debug, Clone)]
pub struct ResolverContext<R: Record> {
    scope: ScopeConfig,
    keys: CacheKeyBuilder,
    cache: Option<Arc<dyn Cache>>,
    repository: Option<Arc<dyn RecordRepository<R>>>,
    service: Option<Arc<dyn RecordService<R>>>,
    initializer: Option<Arc<dyn StorageInitializer>>,
}

impl<R: Record> ResolverContext<R> {
    pub fn new(scope: ScopeConfig) -> Self {
        Self {
            keys: scope.key_builder(),
            scope,
            cache: None,
            repository: None,
            service: None,
            initializer: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_repository(mut self, repository: Arc<dyn RecordRepository<R>>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_service(mut self, service: Arc<dyn RecordService<R>>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn with_initializer(mut self, initializer: Arc<dyn StorageInitializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn scope(&self) -> &ScopeConfig {
        &self.scope
    }

    /// Key builder of the record scope
    pub fn keys(&self) -> &CacheKeyBuilder {
        &self.keys
    }

    pub fn cache(&self) -> Result<&Arc<dyn Cache>, DomainError> {
        self.cache
            .as_ref()
            .ok_or_else(|| DomainError::missing_collaborator("cache"))
    }

    pub fn repository(&self) -> Result<&Arc<dyn RecordRepository<R>>, DomainError> {
        self.repository
            .as_ref()
            .ok_or_else(|| DomainError::missing_collaborator("repository"))
    }

    pub fn service(&self) -> Result<&Arc<dyn RecordService<R>>, DomainError> {
        self.service
            .as_ref()
            .ok_or_else(|| DomainError::missing_collaborator("record service"))
    }

    pub fn predicate(&self) -> Result<AttributePredicate<R>, DomainError> {
        Ok(AttributePredicate::new(self.service()?.clone()))
    }

    /// Whether results of this scope may be written to the cache
    pub fn is_cache_eligible(&self) -> bool {
        self.scope.cache_eligible
    }

    pub async fn read<V>(&self, key: &str) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned + Send,
    {
        let value = self.cache()?.get(key, &self.scope.read_params).await?;

        tracing::debug!(
            store = %self.keys,
            key = %key,
            hit = value.is_some(),
            "Cache read"
        );

        Ok(value)
    }

    /// Reads several keys at once, in key order
    pub async fn read_many<V>(&self, keys: &[String]) -> Result<Vec<Option<V>>, DomainError>
    where
        V: DeserializeOwned + Send,
    {
        let values = self.cache()?
            .get_many(keys, &self.scope.read_params)
            .await?;

        tracing::debug!(
            store = %self.keys,
            keys = keys.len(),
            hits = values.iter().filter(|v| v.is_some()).count(),
            "Cache multi-read"
        );

        Ok(values)
    }

    pub async fn write<V>(&self, key: &str, value: &V) -> Result<(), DomainError>
    where
        V: Serialize + Send + Sync,
    {
        self.cache()?
            .set(key, value, &self.scope.write_params)
            .await?;

        tracing::debug!(store = %self.keys, key = %key, "Cache write");
        Ok(())
    }

    /// Whether the population marker of `keys` is present
    pub async fn is_populated(&self, keys: &CacheKeyBuilder) -> Result<bool, DomainError> {
        self.cache()?.exists(&keys.populated_key()).await
    }

    /// Sends the storage-initialization signal for the record scope
    pub async fn request_initialization(&self) -> Result<bool, DomainError> {
        let Some(initializer) = &self.initializer else {
            tracing::debug!(store = %self.keys, "No storage initializer configured");
            return Ok(false);
        };

        tracing::info!(store = %self.keys, "Requesting storage initialization");

        let accepted = initializer.request_initialization(&self.keys).await?;
        record_initialization_request(self.keys.store(), accepted);

        Ok(accepted)
    }

    /// Queries the backing store and normalizes every record
    pub async fn fetch(&self, query: &RecordQuery) -> Result<Vec<R>, DomainError> {
        let records = self.repository()?.search(query).await?;
        let service = self.service()?;

        tracing::debug!(
            store = %self.keys,
            ids = ?query.ids,
            fetched = records.len(),
            "Backing store fallback"
        );

        Ok(records
            .into_iter()
            .map(|record| service.normalize(record))
            .collect())
    }
}

/// Sends the initialization signal at most once per resolver call
///
/// Several lookups within one call may find the cache empty; only the first
/// one signals.
#[derive(Debug, Default)]
pub struct InitializationGuard {
    signalled: HashSet<String>,
}

impl InitializationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `marker_scope` is populated, signalling once if it is not
    pub async fn ensure_populated<R: Record>(
        &mut self,
        ctx: &ResolverContext<R>,
        marker_scope: &CacheKeyBuilder,
    ) -> Result<bool, DomainError> {
        if ctx.is_populated(marker_scope).await? {
            return Ok(true);
        }

        if self.signalled.insert(ctx.keys().prefix()) {
            ctx.request_initialization().await?;
        }

        Ok(false)
    }
}
