//! Page-scoped listings with separately cached pagination metadata

use std::fmt;

use async_trait::async_trait;

use crate::domain::cache::Discriminator;
use crate::domain::record::{
    FilterSpec, PageRequest, PaginationMetadata, Record, RecordId, RecordQuery,
};
use crate::domain::resolver::{IdResolver, ListQuery, ListResolver, ResolutionOutcome};
use crate::domain::DomainError;

use super::context::ResolverContext;

/// Caches the ordered identifiers of a page and its metadata under two keys
///
/// Records themselves are resolved through the delegate, so a page hit
/// still benefits from whatever caching the delegate does.
pub struct PaginatedCacheResolver<R: Record> {
    ctx: ResolverContext<R>,
    delegate: Box<dyn IdResolver<R>>,
    metadata: Option<PaginationMetadata>,
}

impl<R: Record> fmt::Debug for PaginatedCacheResolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedCacheResolver")
            .field("ctx", &self.ctx)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<R: Record> PaginatedCacheResolver<R> {
    pub fn new(ctx: ResolverContext<R>, delegate: Box<dyn IdResolver<R>>) -> Self {
        Self {
            ctx,
            delegate,
            metadata: None,
        }
    }

    pub fn context(&self) -> &ResolverContext<R> {
        &self.ctx
    }

    /// Metadata of the last page listed
    pub fn metadata(&self) -> Option<&PaginationMetadata> {
        self.metadata.as_ref()
    }
}

#[async_trait]
impl<R: Record> ListResolver<R> for PaginatedCacheResolver<R> {
    async fn list(
        &mut self,
        query: &ListQuery,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let page = PageRequest::new(query.page.unwrap_or(1), self.ctx.scope().page_size);
        let keys = self.ctx.keys();
        let ids_key = keys.build(Some(&Discriminator::Page(page)), &query.filter);
        let meta_key = keys.build(Some(&Discriminator::PageMeta(page)), &query.filter);
        let store_query = RecordQuery::matching(query.filter.clone());

        let cached_ids = if cache_enabled {
            self.ctx.read::<Vec<RecordId>>(&ids_key).await?
        } else {
            None
        };

        let mut from_cache = cached_ids.is_some();
        let mut metadata = None;

        let ids = match cached_ids {
            Some(ids) => ids,
            None => {
                let fetched = self
                    .ctx
                    .repository()?
                    .search_page(&store_query, page)
                    .await?;
                let service = self.ctx.service()?;

                let ids = fetched
                    .records
                    .iter()
                    .map(|record| service.primary_key(record))
                    .collect::<Result<Vec<_>, _>>()?;

                if cache_enabled && self.ctx.scope().is_page_cacheable(page.number) {
                    self.ctx.write(&ids_key, &ids).await?;
                    self.ctx.write(&meta_key, &fetched.metadata).await?;
                }

                metadata = Some(fetched.metadata);
                ids
            }
        };

        let records = self
            .delegate
            .by_ids_with_cache(&ids, &FilterSpec::new(), cache_enabled)
            .await?;
        from_cache &= records.from_cache;

        let metadata = match metadata {
            Some(metadata) => metadata,
            None => {
                let cached = if cache_enabled {
                    self.ctx.read::<PaginationMetadata>(&meta_key).await?
                } else {
                    None
                };

                match cached {
                    Some(metadata) => metadata,
                    None => {
                        from_cache = false;
                        self.ctx
                            .repository()?
                            .pagination(&store_query, page)
                            .await?
                    }
                }
            }
        };

        tracing::debug!(
            store = %self.ctx.keys(),
            page = page.number,
            records = records.value.len(),
            from_cache,
            "Listed page"
        );

        self.metadata = Some(metadata);
        Ok(ResolutionOutcome::new(records.value, from_cache))
    }
}
