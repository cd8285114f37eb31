//! Resolver over a materialized collection, without cache

use async_trait::async_trait;

use crate::domain::record::{FilterSpec, Record, RecordId, RecordQuery};
use crate::domain::resolver::{
    FilterResolver, IdResolver, ListQuery, ListResolver, ResolutionOutcome,
};
use crate::domain::DomainError;

use super::context::ResolverContext;
use super::resident::ResidentSet;

/// Serves every lookup by iterating the whole collection
///
/// The collection is loaded from the backing store on first use, or handed
/// in up front with [`InMemoryResolver::with_records`].
#[derive(Debug)]
pub struct InMemoryResolver<R: Record> {
    ctx: ResolverContext<R>,
    resident: Option<ResidentSet<R>>,
}

impl<R: Record> InMemoryResolver<R> {
    pub fn new(ctx: ResolverContext<R>) -> Self {
        Self {
            ctx,
            resident: None,
        }
    }

    pub fn context(&self) -> &ResolverContext<R> {
        &self.ctx
    }

    /// Builds a resolver over a caller-held collection
    pub fn with_records(ctx: ResolverContext<R>, mut records: Vec<R>) -> Result<Self, DomainError> {
        let service = ctx.service()?;
        service.sort(&mut records);
        let resident = ResidentSet::build(records, service.as_ref())?;

        Ok(Self {
            ctx,
            resident: Some(resident),
        })
    }

    async fn load(&mut self) -> Result<ResolutionOutcome<&ResidentSet<R>>, DomainError> {
        let from_cache = self.resident.is_some();

        if self.resident.is_none() {
            let mut records = self.ctx.fetch(&RecordQuery::all()).await?;
            let service = self.ctx.service()?;
            service.sort(&mut records);
            self.resident = Some(ResidentSet::build(records, service.as_ref())?);
        }

        match &self.resident {
            Some(resident) => Ok(ResolutionOutcome::new(resident, from_cache)),
            None => Err(DomainError::storage("Collection was not loaded")),
        }
    }
}

#[async_trait]
impl<R: Record> ListResolver<R> for InMemoryResolver<R> {
    async fn list(
        &mut self,
        query: &ListQuery,
        _cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let loaded = self.load().await?;
        let records = loaded.value.matching(&query.filter, &predicate)?;

        Ok(ResolutionOutcome::new(records, loaded.from_cache))
    }
}

#[async_trait]
impl<R: Record> IdResolver<R> for InMemoryResolver<R> {
    async fn by_ids(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let loaded = self.load().await?;
        let records = loaded.value.by_ids(ids, filter, &predicate)?;

        Ok(ResolutionOutcome::new(records, loaded.from_cache))
    }
}

#[async_trait]
impl<R: Record> FilterResolver<R> for InMemoryResolver<R> {
    async fn by_expression(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let service = self.ctx.service()?.clone();
        let loaded = self.load().await?;
        let records = loaded
            .value
            .filter_expression(filter, &predicate, service.as_ref())?;

        Ok(ResolutionOutcome::new(records, loaded.from_cache))
    }

    async fn by_multi(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let service = self.ctx.service()?.clone();
        let loaded = self.load().await?;
        let records = loaded.value.filter_multi(filter, &predicate, service.as_ref())?;

        Ok(ResolutionOutcome::new(records, loaded.from_cache))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::Value;

    use crate::domain::record::mock::{product, product_service, products, CountingRepository};
    use crate::domain::resolver::ScopeConfig;

    fn resolver(repository: Arc<CountingRepository>) -> InMemoryResolver<Value> {
        InMemoryResolver::new(
            ResolverContext::new(ScopeConfig::new("shop:", "products"))
                .with_repository(repository)
                .with_service(product_service()),
        )
    }

    fn ids(records: &[Value]) -> Vec<i64> {
        records.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_list_loads_once_and_sorts() {
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(repository.clone());

        let first = resolver.list(&ListQuery::new(), true).await.unwrap();
        let second = resolver.list(&ListQuery::new(), true).await.unwrap();

        assert_eq!(ids(&first.value), vec![1, 2, 3]);
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.value, second.value);
        assert_eq!(repository.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_applies_query_filter() {
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(repository);

        let query = ListQuery::new().with_filter(FilterSpec::new().with("status", "draft"));
        let outcome = resolver.list(&query, false).await.unwrap();

        assert_eq!(ids(&outcome.value), vec![2]);
    }

    #[tokio::test]
    async fn test_empty_store_is_empty_list() {
        let repository = Arc::new(CountingRepository::new(Vec::new()));
        let mut resolver = resolver(repository);

        let outcome = resolver.list(&ListQuery::new(), true).await.unwrap();
        assert!(outcome.value.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let repository =
            Arc::new(CountingRepository::new(products()).with_error("connection reset"));
        let mut resolver = resolver(repository);

        let result = resolver.list(&ListQuery::new(), true).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_by_id_exact_type_match() {
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(repository);

        let hit = resolver.by_id(&1.into(), &FilterSpec::new()).await.unwrap();
        let text = resolver.by_id(&"1".into(), &FilterSpec::new()).await.unwrap();

        assert_eq!(hit.value.unwrap()["slug"], "alpha");
        assert!(text.value.is_none());
    }

    #[tokio::test]
    async fn test_by_ids_with_filter() {
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(repository);

        let outcome = resolver
            .by_ids(
                &[3.into(), 2.into(), 1.into()],
                &FilterSpec::new().with("status", "active"),
            )
            .await
            .unwrap();

        assert_eq!(ids(&outcome.value), vec![3, 1]);
    }

    #[tokio::test]
    async fn test_with_records_skips_store() {
        let repository = Arc::new(CountingRepository::new(Vec::new()));
        let ctx = ResolverContext::new(ScopeConfig::default())
            .with_repository(repository.clone())
            .with_service(product_service());
        let mut resolver =
            InMemoryResolver::with_records(ctx, vec![product(8, "h", "active")]).unwrap();

        let outcome = resolver.by(&FilterSpec::new().with("slug", "h")).await.unwrap();

        assert_eq!(outcome.value.unwrap()["id"], 8);
        assert!(outcome.from_cache);
        assert_eq!(repository.calls(), 0);
    }

    #[tokio::test]
    async fn test_by_expression_and_by_multi() {
        let repository = Arc::new(CountingRepository::new(products()));
        let mut resolver = resolver(repository);

        let expression = resolver
            .by_expression(&FilterSpec::new().with("name", "product [12]"))
            .await
            .unwrap();
        let multi = resolver
            .by_multi(&FilterSpec::new().with("status", "active").with("brand", false))
            .await
            .unwrap();

        assert_eq!(ids(&expression.value), vec![1, 2]);
        assert_eq!(ids(&multi.value), vec![1, 3]);
    }
}
