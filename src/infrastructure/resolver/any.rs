//! Strategy chosen at configuration time

use crate::domain::record::{FilterSpec, PaginationMetadata, Record, RecordId};
use crate::domain::resolver::{
    AliasResolver, FilterResolver, IdResolver, ListQuery, ListResolver, ResolutionOutcome,
    ResolverKind,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_resolution;

use super::chunked::ChunkedCacheResolver;
use super::context::ResolverContext;
use super::in_memory::InMemoryResolver;
use super::keyed::KeyedCacheResolver;
use super::paginated::PaginatedCacheResolver;

/// One of the four lookup strategies
///
/// Operations a strategy does not support fail with `NotImplemented`.
#[derive(Debug)]
pub enum AnyResolver<R: Record> {
    InMemory(InMemoryResolver<R>),
    Keyed(KeyedCacheResolver<R>),
    Chunked(ChunkedCacheResolver<R>),
    Paginated(PaginatedCacheResolver<R>),
}

impl<R: Record> AnyResolver<R> {
    /// Builds the resolver for `kind`; paginated listings resolve records
    /// through a chunked resolver over the same context
    pub fn build(kind: ResolverKind, ctx: ResolverContext<R>) -> Self {
        match kind {
            ResolverKind::InMemory => Self::InMemory(InMemoryResolver::new(ctx)),
            ResolverKind::Keyed => Self::Keyed(KeyedCacheResolver::new(ctx)),
            ResolverKind::Chunked => Self::Chunked(ChunkedCacheResolver::new(ctx)),
            ResolverKind::Paginated => {
                let delegate = Box::new(ChunkedCacheResolver::new(ctx.clone()));
                Self::Paginated(PaginatedCacheResolver::new(ctx, delegate))
            }
        }
    }

    pub fn kind(&self) -> ResolverKind {
        match self {
            Self::InMemory(_) => ResolverKind::InMemory,
            Self::Keyed(_) => ResolverKind::Keyed,
            Self::Chunked(_) => ResolverKind::Chunked,
            Self::Paginated(_) => ResolverKind::Paginated,
        }
    }

    /// Metadata of the last page listed by a paginated resolver
    pub fn metadata(&self) -> Option<&PaginationMetadata> {
        match self {
            Self::Paginated(resolver) => resolver.metadata(),
            _ => None,
        }
    }

    pub fn context(&self) -> &ResolverContext<R> {
        match self {
            Self::InMemory(resolver) => resolver.context(),
            Self::Keyed(resolver) => resolver.context(),
            Self::Chunked(resolver) => resolver.context(),
            Self::Paginated(resolver) => resolver.context(),
        }
    }

    fn unsupported(kind: ResolverKind, operation: &str) -> DomainError {
        DomainError::not_implemented(operation, kind.to_string())
    }

    fn observe<T>(
        &self,
        operation: &str,
        outcome: Result<ResolutionOutcome<T>, DomainError>,
    ) -> Result<ResolutionOutcome<T>, DomainError> {
        if let Ok(outcome) = &outcome {
            record_resolution(self.context().keys().store(), operation, outcome.from_cache);
        }
        outcome
    }

    pub async fn list(
        &mut self,
        query: &ListQuery,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::InMemory(resolver) => resolver.list(query, cache_enabled).await,
            Self::Keyed(resolver) => resolver.list(query, cache_enabled).await,
            Self::Paginated(resolver) => resolver.list(query, cache_enabled).await,
            Self::Chunked(_) => Err(Self::unsupported(kind, "list")),
        };
        self.observe("list", outcome)
    }

    pub async fn by_id(
        &mut self,
        id: &RecordId,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::InMemory(resolver) => resolver.by_id(id, filter).await,
            Self::Keyed(resolver) => resolver.by_id(id, filter).await,
            Self::Chunked(resolver) => resolver.by_id(id, filter).await,
            Self::Paginated(_) => Err(Self::unsupported(kind, "by_id")),
        };
        self.observe("by_id", outcome)
    }

    pub async fn by_ids(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::InMemory(resolver) => resolver.by_ids(ids, filter).await,
            Self::Keyed(resolver) => resolver.by_ids(ids, filter).await,
            Self::Chunked(resolver) => resolver.by_ids(ids, filter).await,
            Self::Paginated(_) => Err(Self::unsupported(kind, "by_ids")),
        };
        self.observe("by_ids", outcome)
    }

    pub async fn by_alias(
        &mut self,
        alias: &str,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::Keyed(resolver) => resolver.by_alias(alias, filter).await,
            Self::Chunked(resolver) => resolver.by_alias(alias, filter).await,
            Self::InMemory(_) | Self::Paginated(_) => Err(Self::unsupported(kind, "by_alias")),
        };
        self.observe("by_alias", outcome)
    }

    pub async fn by_expression(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::InMemory(resolver) => resolver.by_expression(filter).await,
            Self::Keyed(resolver) => resolver.by_expression(filter).await,
            Self::Chunked(_) | Self::Paginated(_) => Err(Self::unsupported(kind, "by_expression")),
        };
        self.observe("by_expression", outcome)
    }

    pub async fn by_multi(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::InMemory(resolver) => resolver.by_multi(filter).await,
            Self::Keyed(resolver) => resolver.by_multi(filter).await,
            Self::Chunked(_) | Self::Paginated(_) => Err(Self::unsupported(kind, "by_multi")),
        };
        self.observe("by_multi", outcome)
    }

    pub async fn by(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let kind = self.kind();
        let outcome = match self {
            Self::InMemory(resolver) => resolver.by(filter).await,
            Self::Keyed(resolver) => resolver.by(filter).await,
            Self::Chunked(_) | Self::Paginated(_) => Err(Self::unsupported(kind, "by")),
        };
        self.observe("by", outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::Value;

    use crate::domain::cache::MockCache;
    use crate::domain::record::mock::{product_service, products, CountingRepository};
    use crate::domain::resolver::ScopeConfig;

    fn context() -> ResolverContext<Value> {
        ResolverContext::new(ScopeConfig::new("shop:", "products"))
            .with_cache(Arc::new(MockCache::new()))
            .with_repository(Arc::new(CountingRepository::new(products())))
            .with_service(product_service())
    }

    #[test]
    fn test_build_kind() {
        for kind in [
            ResolverKind::InMemory,
            ResolverKind::Keyed,
            ResolverKind::Chunked,
            ResolverKind::Paginated,
        ] {
            assert_eq!(AnyResolver::build(kind, context()).kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_chunked_list_not_implemented() {
        let mut resolver = AnyResolver::build(ResolverKind::Chunked, context());

        let result = resolver.list(&ListQuery::new(), true).await;

        match result {
            Err(DomainError::NotImplemented { operation, strategy }) => {
                assert_eq!(operation, "list");
                assert_eq!(strategy, "chunked");
            }
            other => panic!("Expected NotImplemented, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let mut chunked = AnyResolver::build(ResolverKind::Chunked, context());
        let mut paginated = AnyResolver::build(ResolverKind::Paginated, context());
        let mut in_memory = AnyResolver::build(ResolverKind::InMemory, context());
        let filter = FilterSpec::new();

        assert!(matches!(
            chunked.by_expression(&filter).await,
            Err(DomainError::NotImplemented { .. })
        ));
        assert!(matches!(
            chunked.by(&filter).await,
            Err(DomainError::NotImplemented { .. })
        ));
        assert!(matches!(
            paginated.by_ids(&[1.into()], &filter).await,
            Err(DomainError::NotImplemented { .. })
        ));
        assert!(matches!(
            in_memory.by_alias("alpha", &filter).await,
            Err(DomainError::NotImplemented { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatch() {
        let mut keyed = AnyResolver::build(ResolverKind::Keyed, context());
        let mut paginated = AnyResolver::build(ResolverKind::Paginated, context());

        let record = keyed.by_id(&2.into(), &FilterSpec::new()).await.unwrap();
        let page = paginated.list(&ListQuery::new(), true).await.unwrap();

        assert_eq!(record.value.unwrap()["slug"], "beta");
        assert_eq!(page.value.len(), 3);
        assert_eq!(paginated.metadata().unwrap().total_count, 3);
        assert!(keyed.metadata().is_none());
    }
}
