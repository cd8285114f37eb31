//! Cache-first resolver for large collections, identifier-scoped access only

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::cache::{Discriminator, ReadStrategy};
use crate::domain::record::{AttributePredicate, FilterSpec, Record, RecordId, RecordQuery};
use crate::domain::resolver::{AliasResolver, IdResolver, ResolutionOutcome};
use crate::domain::DomainError;

use super::alias::resolve_primary_key_by_alias;
use super::context::{InitializationGuard, ResolverContext};

/// Records already resolved during this session
#[derive(Debug)]
struct WorkingSet<R> {
    records: HashMap<RecordId, R>,
    aliases: HashMap<String, RecordId>,
}

impl<R> WorkingSet<R> {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    fn contains_all(&self, ids: &[RecordId]) -> bool {
        ids.iter().all(|id| self.records.contains_key(id))
    }
}

/// Caches records by identifier and identifier set
///
/// With [`ReadStrategy::Whole`] an identifier set is one cache entry and a
/// miss refetches the whole set. With [`ReadStrategy::PerRecord`] every
/// record has its own entry and only the missing identifiers are fetched.
#[derive(Debug)]
pub struct ChunkedCacheResolver<R: Record> {
    ctx: ResolverContext<R>,
    working: WorkingSet<R>,
}

impl<R: Record> ChunkedCacheResolver<R> {
    pub fn new(ctx: ResolverContext<R>) -> Self {
        Self {
            ctx,
            working: WorkingSet::new(),
        }
    }

    pub fn context(&self) -> &ResolverContext<R> {
        &self.ctx
    }

    fn record_key(&self, id: &RecordId) -> String {
        self.ctx
            .keys()
            .build(Some(&Discriminator::Id(id.clone())), &FilterSpec::new())
    }

    fn select(
        records: &HashMap<RecordId, R>,
        ids: &[RecordId],
        filter: &FilterSpec,
        predicate: &AttributePredicate<R>,
    ) -> Result<Vec<R>, DomainError> {
        let mut selected = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(record) = records.get(id) {
                if predicate.matches(record, filter)? {
                    selected.push(record.clone());
                }
            }
        }

        Ok(selected)
    }

    async fn resolve_ids(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
        caching: bool,
        guard: &mut InitializationGuard,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        if ids.is_empty() {
            return Ok(ResolutionOutcome::cached(Vec::new()));
        }

        let predicate = self.ctx.predicate()?;

        if self.working.contains_all(ids) {
            let records = Self::select(&self.working.records, ids, filter, &predicate)?;
            return Ok(ResolutionOutcome::cached(records));
        }

        let service = self.ctx.service()?.clone();
        let strategy = self.ctx.scope().read_params.read_strategy;

        let mut seen = HashSet::new();
        let unique: Vec<RecordId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();
        let combined_key = self
            .ctx
            .keys()
            .build(Some(&Discriminator::Ids(unique.clone())), &FilterSpec::new());

        let mut found: HashMap<RecordId, R> = HashMap::with_capacity(unique.len());
        let mut missing = unique.clone();

        if caching && guard.ensure_populated(&self.ctx, self.ctx.keys()).await? {
            match strategy {
                ReadStrategy::Whole => {
                    if let Some(records) = self.ctx.read::<Vec<R>>(&combined_key).await? {
                        for record in records {
                            found.insert(service.primary_key(&record)?, record);
                        }
                        missing.clear();
                    }
                }
                ReadStrategy::PerRecord => {
                    let keys: Vec<String> = unique.iter().map(|id| self.record_key(id)).collect();
                    let values = self.ctx.read_many::<R>(&keys).await?;

                    for (id, value) in unique.iter().zip(values) {
                        if let Some(record) = value {
                            found.insert(id.clone(), record);
                        }
                    }

                    missing.retain(|id| !found.contains_key(id));
                }
            }
        }

        let from_cache = missing.is_empty();

        if !missing.is_empty() {
            tracing::debug!(
                store = %self.ctx.keys(),
                ids = ?missing,
                strategy = %strategy,
                "Fetching missing records"
            );

            let fetched = self.ctx.fetch(&RecordQuery::by_ids(missing)).await?;
            let mut fetched_ids = Vec::with_capacity(fetched.len());

            for record in fetched {
                let id = service.primary_key(&record)?;
                fetched_ids.push(id.clone());
                found.entry(id).or_insert(record);
            }

            if caching && self.ctx.is_cache_eligible() {
                match strategy {
                    ReadStrategy::Whole => {
                        let records: Vec<&R> =
                            unique.iter().filter_map(|id| found.get(id)).collect();
                        self.ctx.write(&combined_key, &records).await?;
                    }
                    ReadStrategy::PerRecord => {
                        for id in &fetched_ids {
                            if let Some(record) = found.get(id) {
                                self.ctx.write(&self.record_key(id), record).await?;
                            }
                        }
                    }
                }
            }
        }

        let records = Self::select(&found, ids, filter, &predicate)?;
        self.working.records.extend(found);

        Ok(ResolutionOutcome::new(records, from_cache))
    }
}

#[async_trait]
impl<R: Record> IdResolver<R> for ChunkedCacheResolver<R> {
    async fn by_ids(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let caching = self.ctx.scope().cache_enabled;
        let mut guard = InitializationGuard::new();
        self.resolve_ids(ids, filter, caching, &mut guard).await
    }

    async fn by_ids_with_cache(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let mut guard = InitializationGuard::new();
        self.resolve_ids(ids, filter, cache_enabled, &mut guard).await
    }
}

#[async_trait]
impl<R: Record> AliasResolver<R> for ChunkedCacheResolver<R> {
    async fn by_alias(
        &mut self,
        alias: &str,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;

        let known = self
            .working
            .aliases
            .get(alias)
            .and_then(|id| self.working.records.get(id));

        if let Some(record) = known {
            let record = predicate.matches(record, filter)?.then(|| record.clone());
            return Ok(ResolutionOutcome::cached(record));
        }

        let mut guard = InitializationGuard::new();
        let resolved = resolve_primary_key_by_alias(&self.ctx, None, &mut guard, alias).await?;

        let Some(id) = resolved.value else {
            return Ok(ResolutionOutcome::new(None, resolved.from_cache));
        };

        let caching = self.ctx.scope().cache_enabled;
        let outcome = self
            .resolve_ids(std::slice::from_ref(&id), &FilterSpec::new(), caching, &mut guard)
            .await?;
        let from_cache = resolved.from_cache && outcome.from_cache;

        let Some(record) = outcome.value.into_iter().next() else {
            return Ok(ResolutionOutcome::new(None, from_cache));
        };

        self.working.aliases.insert(alias.to_string(), id);

        let record = predicate.matches(&record, filter)?.then_some(record);

        Ok(ResolutionOutcome::new(record, from_cache))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::Value;

    use crate::domain::cache::{CacheParams, MockCache, MockStorageInitializer};
    use crate::domain::record::mock::{product, product_service, products, CountingRepository};
    use crate::domain::resolver::ScopeConfig;

    fn scope(strategy: ReadStrategy) -> ScopeConfig {
        ScopeConfig::new("shop:", "products")
            .with_read_params(CacheParams::default().with_read_strategy(strategy))
    }

    fn quiet_initializer() -> MockStorageInitializer {
        let mut initializer = MockStorageInitializer::new();
        initializer
            .expect_request_initialization()
            .returning(|_| Ok(true));
        initializer
    }

    fn resolver(
        scope: ScopeConfig,
        cache: Arc<MockCache>,
        repository: Arc<CountingRepository>,
        initializer: MockStorageInitializer,
    ) -> ChunkedCacheResolver<Value> {
        ChunkedCacheResolver::new(
            ResolverContext::new(scope)
                .with_cache(cache)
                .with_repository(repository)
                .with_service(product_service())
                .with_initializer(Arc::new(initializer)),
        )
    }

    /// Cache whose record scope carries the population marker
    fn populated_cache() -> MockCache {
        let marker = scope(ReadStrategy::Whole).key_builder().populated_key();
        MockCache::new().with_entry(&marker, &true, None)
    }

    fn ids_key(ids: &[i64]) -> String {
        let ids = ids.iter().map(|&id| RecordId::from(id)).collect();
        scope(ReadStrategy::Whole)
            .key_builder()
            .build(Some(&Discriminator::Ids(ids)), &FilterSpec::new())
    }

    fn record_key(id: i64) -> String {
        scope(ReadStrategy::Whole)
            .key_builder()
            .build(Some(&Discriminator::Id(id.into())), &FilterSpec::new())
    }

    fn ids(records: &[Value]) -> Vec<i64> {
        records.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    fn wanted(ids: &[i64]) -> Vec<RecordId> {
        ids.iter().map(|&id| RecordId::from(id)).collect()
    }

    #[tokio::test]
    async fn test_empty_ids_touch_nothing() {
        let cache = Arc::new(MockCache::new());
        let repository = Arc::new(CountingRepository::new(products()));
        let mut initializer = MockStorageInitializer::new();
        initializer.expect_request_initialization().times(0);
        let mut resolver = resolver(
            scope(ReadStrategy::Whole),
            cache.clone(),
            repository.clone(),
            initializer,
        );

        let outcome = resolver.by_ids(&[], &FilterSpec::new()).await.unwrap();

        assert!(outcome.value.is_empty());
        assert!(outcome.from_cache);
        assert_eq!(cache.reads(), 0);
        assert_eq!(repository.calls(), 0);
    }

    #[tokio::test]
    async fn test_repeated_lookup_is_cache_sourced() {
        let cache = Arc::new(populated_cache());
        let repository = Arc::new(CountingRepository::new(products()));

        let mut first = resolver(
            scope(ReadStrategy::Whole),
            cache.clone(),
            repository.clone(),
            quiet_initializer(),
        );
        let cold = first
            .by_ids(&wanted(&[3, 1, 2]), &FilterSpec::new())
            .await
            .unwrap();

        let mut second = resolver(
            scope(ReadStrategy::Whole),
            cache.clone(),
            repository.clone(),
            quiet_initializer(),
        );
        let warm = second
            .by_ids(&wanted(&[1, 2, 3]), &FilterSpec::new())
            .await
            .unwrap();

        assert_eq!(ids(&cold.value), vec![3, 1, 2]);
        assert_eq!(ids(&warm.value), vec![1, 2, 3]);
        assert!(!cold.from_cache);
        assert!(warm.from_cache);
        assert_eq!(repository.search_calls(), 1);
        assert!(cache.contains(&ids_key(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_whole_strategy_partial_hit_refetches_everything() {
        let cache = Arc::new(populated_cache().with_entry(
            &ids_key(&[1, 2]),
            &vec![product(1, "alpha", "active"), product(2, "beta", "draft")],
            None,
        ));
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::Whole),
            cache,
            repository.clone(),
            quiet_initializer(),
        );

        let outcome = resolver
            .by_ids(&wanted(&[1, 2, 3]), &FilterSpec::new())
            .await
            .unwrap();

        assert_eq!(ids(&outcome.value), vec![1, 2, 3]);
        assert!(!outcome.from_cache);
        assert_eq!(repository.last_query().unwrap().ids, Some(wanted(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn test_per_record_strategy_fetches_only_missing() {
        let cache = Arc::new(
            populated_cache()
                .with_entry(&record_key(1), &product(1, "alpha", "active"), None)
                .with_entry(&record_key(2), &product(2, "beta", "draft"), None),
        );
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::PerRecord),
            cache.clone(),
            repository.clone(),
            quiet_initializer(),
        );

        let outcome = resolver
            .by_ids(&wanted(&[1, 2, 3]), &FilterSpec::new())
            .await
            .unwrap();

        assert_eq!(ids(&outcome.value), vec![1, 2, 3]);
        assert!(!outcome.from_cache);
        assert_eq!(repository.last_query().unwrap().ids, Some(wanted(&[3])));
        assert!(cache.contains(&record_key(3)));
    }

    #[tokio::test]
    async fn test_cold_scope_signals_and_fetches() {
        let mut initializer = MockStorageInitializer::new();
        initializer
            .expect_request_initialization()
            .times(1)
            .returning(|_| Ok(true));

        let cache = Arc::new(MockCache::new());
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::Whole),
            cache.clone(),
            repository.clone(),
            initializer,
        );

        let outcome = resolver
            .by_ids(&wanted(&[2, 9]), &FilterSpec::new())
            .await
            .unwrap();

        assert_eq!(ids(&outcome.value), vec![2]);
        assert_eq!(cache.reads(), 0);
        assert_eq!(repository.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_working_set_serves_repeats() {
        let cache = Arc::new(populated_cache());
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::Whole),
            cache.clone(),
            repository.clone(),
            quiet_initializer(),
        );

        resolver.by_ids(&wanted(&[1, 2]), &FilterSpec::new()).await.unwrap();
        let reads = cache.reads();

        let outcome = resolver
            .by_id(&2.into(), &FilterSpec::new())
            .await
            .unwrap();

        assert_eq!(outcome.value.unwrap()["slug"], "beta");
        assert!(outcome.from_cache);
        assert_eq!(cache.reads(), reads);
        assert_eq!(repository.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_filter_applies_after_resolution() {
        let cache = Arc::new(populated_cache());
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::Whole),
            cache,
            repository,
            quiet_initializer(),
        );

        let outcome = resolver
            .by_ids(&wanted(&[1, 2, 3]), &FilterSpec::new().with("status", "active"))
            .await
            .unwrap();

        assert_eq!(ids(&outcome.value), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_ineligible_scope_skips_write_back() {
        let cache = Arc::new(populated_cache());
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::PerRecord).with_cache_eligible(false),
            cache.clone(),
            repository,
            quiet_initializer(),
        );

        resolver.by_ids(&wanted(&[1]), &FilterSpec::new()).await.unwrap();
        assert_eq!(cache.writes(), 0);
    }

    #[tokio::test]
    async fn test_alias_registers_in_working_set() {
        let mut initializer = MockStorageInitializer::new();
        initializer
            .expect_request_initialization()
            .times(1)
            .returning(|_| Ok(true));

        let cache = Arc::new(MockCache::new());
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(
            scope(ReadStrategy::Whole),
            cache.clone(),
            repository.clone(),
            initializer,
        );

        let first = resolver.by_alias("gamma", &FilterSpec::new()).await.unwrap();
        let reads = cache.reads();
        let second = resolver
            .by_alias("gamma", &FilterSpec::new().with("status", "draft"))
            .await
            .unwrap();

        assert_eq!(first.value.unwrap()["id"], 3);
        assert!(!first.from_cache);
        assert!(second.value.is_none());
        assert!(second.from_cache);
        assert_eq!(cache.reads(), reads);
        assert_eq!(repository.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_text_id_does_not_hit_integer_entry() {
        let cache = Arc::new(populated_cache());
        let repository = Arc::new(CountingRepository::new(products()));

        let mut first = resolver(
            scope(ReadStrategy::PerRecord),
            cache.clone(),
            repository.clone(),
            quiet_initializer(),
        );
        let numeric = first.by_id(&RecordId::from(1), &FilterSpec::new()).await.unwrap();

        let mut second = resolver(
            scope(ReadStrategy::PerRecord),
            cache.clone(),
            repository.clone(),
            quiet_initializer(),
        );
        let textual = second.by_id(&RecordId::from("1"), &FilterSpec::new()).await.unwrap();

        assert_eq!(numeric.value.unwrap()["slug"], "alpha");
        assert!(cache.contains(&record_key(1)));
        assert!(textual.value.is_none());
        assert!(!textual.from_cache);
        assert_eq!(repository.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_after_miss_propagates() {
        let cache = Arc::new(populated_cache());
        let repository = Arc::new(CountingRepository::new(products()).with_error("timeout"));
        let mut resolver = resolver(
            scope(ReadStrategy::PerRecord),
            cache.clone(),
            repository,
            quiet_initializer(),
        );

        let result = resolver.by_ids(&wanted(&[1, 2]), &FilterSpec::new()).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert_eq!(cache.writes(), 0);
    }
}
