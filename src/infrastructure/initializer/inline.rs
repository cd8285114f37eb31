//! Populates a scope before returning

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::domain::cache::{
    Cache, CacheExt, CacheKeyBuilder, CacheParams, Discriminator, StorageInitializer,
};
use crate::domain::record::{FilterSpec, Record, RecordQuery, RecordRepository, RecordService};
use crate::domain::DomainError;

/// Loads the whole collection and writes every entry a resolver may read
///
/// Writes the unfiltered listing, one entry per record, the alias index and
/// the population markers of both the record and the alias scope. Markers
/// go last so that a populated scope is always complete.
#[derive(Debug)]
pub struct InlineInitializer<R: Record> {
    cache: Arc<dyn Cache>,
    repository: Arc<dyn RecordRepository<R>>,
    service: Arc<dyn RecordService<R>>,
    params: CacheParams,
}

impl<R: Record> InlineInitializer<R> {
    pub fn new(
        cache: Arc<dyn Cache>,
        repository: Arc<dyn RecordRepository<R>>,
        service: Arc<dyn RecordService<R>>,
    ) -> Self {
        Self {
            cache,
            repository,
            service,
            params: CacheParams::default(),
        }
    }

    /// Parameters of every write, normally the scope's write parameters
    pub fn with_params(mut self, params: CacheParams) -> Self {
        self.params = params;
        self
    }

    async fn write_record(
        &self,
        scope: &CacheKeyBuilder,
        alias_scope: &CacheKeyBuilder,
        record: &R,
    ) -> Result<(), DomainError> {
        let empty = FilterSpec::new();
        let id = self.service.primary_key(record)?;

        if let Some(alias) = self.service.alias(record)? {
            let alias_key = alias_scope.build(
                Some(&Discriminator::Alias(self.service.hash(&alias))),
                &empty,
            );
            self.cache.set(&alias_key, &id, &self.params).await?;
        }

        let record_key = scope.build(Some(&Discriminator::Id(id)), &empty);
        self.cache.set(&record_key, record, &self.params).await
    }
}

#[async_trait]
impl<R: Record> StorageInitializer for InlineInitializer<R> {
    async fn request_initialization(&self, scope: &CacheKeyBuilder) -> Result<bool, DomainError> {
        let mut records: Vec<R> = self
            .repository
            .search(&RecordQuery::all())
            .await?
            .into_iter()
            .map(|record| self.service.normalize(record))
            .collect();
        self.service.sort(&mut records);

        let empty = FilterSpec::new();
        let alias_scope = scope.alias_scope();

        self.cache
            .set(&scope.build(None, &empty), &records, &self.params)
            .await?;

        try_join_all(
            records
                .iter()
                .map(|record| self.write_record(scope, &alias_scope, record)),
        )
        .await?;

        self.cache.set(&scope.populated_key(), &true, &self.params).await?;
        self.cache
            .set(&alias_scope.populated_key(), &true, &self.params)
            .await?;

        tracing::info!(store = %scope, records = records.len(), "Scope initialized");
        Ok(true)
    }
}
