//! Cache-first resolver for collections small enough to cache as one list

use async_trait::async_trait;

use crate::domain::cache::Discriminator;
use crate::domain::record::{FilterSpec, Record, RecordId, RecordQuery};
use crate::domain::resolver::{
    AliasResolver, FilterResolver, IdResolver, ListQuery, ListResolver, ResolutionOutcome,
};
use crate::domain::DomainError;

use super::alias::resolve_primary_key_by_alias;
use super::context::{InitializationGuard, ResolverContext};
use super::resident::ResidentSet;

/// Caches whole filtered listings plus an alias index
///
/// The last listing loaded is kept resident, tagged with the cache key it
/// was loaded under, and serves further lookups with the same filter.
#[derive(Debug)]
pub struct KeyedCacheResolver<R: Record> {
    ctx: ResolverContext<R>,
    resident: Option<(String, ResidentSet<R>)>,
}

impl<R: Record> KeyedCacheResolver<R> {
    pub fn new(ctx: ResolverContext<R>) -> Self {
        Self {
            ctx,
            resident: None,
        }
    }

    pub fn context(&self) -> &ResolverContext<R> {
        &self.ctx
    }

    fn resident_for(&self, key: &str) -> Option<&ResidentSet<R>> {
        self.resident
            .as_ref()
            .filter(|(resident_key, _)| resident_key == key)
            .map(|(_, resident)| resident)
    }

    /// The unfiltered listing, used by the id and attribute lookups
    async fn materialize(
        &mut self,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<&ResidentSet<R>>, DomainError> {
        let outcome = self.list(&ListQuery::new(), cache_enabled).await?;

        match &self.resident {
            Some((_, resident)) => Ok(ResolutionOutcome::new(resident, outcome.from_cache)),
            None => Err(DomainError::storage("Listing was not retained")),
        }
    }

    async fn record_by_id(
        &self,
        id: &RecordId,
        guard: &mut InitializationGuard,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let caching = self.ctx.scope().cache_enabled;
        let eligible = self.ctx.is_cache_eligible();
        let key = self
            .ctx
            .keys()
            .build(Some(&Discriminator::Id(id.clone())), &FilterSpec::new());

        if caching {
            if let Some(record) = self.ctx.read::<R>(&key).await? {
                return Ok(ResolutionOutcome::cached(Some(record)));
            }
        }

        // A populated alias index is authoritative for aliased records
        let alias_scope = self.ctx.keys().alias_scope();
        let must_fetch =
            !caching || !eligible || !guard.ensure_populated(&self.ctx, &alias_scope).await?;

        if !must_fetch {
            tracing::debug!(
                store = %self.ctx.keys(),
                id = %id,
                "Aliased record absent from populated scope"
            );
            return Ok(ResolutionOutcome::cached(None));
        }

        let record = self
            .ctx
            .fetch(&RecordQuery::by_ids(vec![id.clone()]))
            .await?
            .into_iter()
            .next();

        if let Some(record) = &record {
            if caching && eligible {
                self.ctx.write(&key, record).await?;
            }
        }

        Ok(ResolutionOutcome::fetched(record))
    }
}

#[async_trait]
impl<R: Record> ListResolver<R> for KeyedCacheResolver<R> {
    async fn list(
        &mut self,
        query: &ListQuery,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let key = self.ctx.keys().build(None, &query.filter);

        if let Some(resident) = self.resident_for(&key) {
            return Ok(ResolutionOutcome::cached(resident.records().to_vec()));
        }

        let service = self.ctx.service()?.clone();
        let mut guard = InitializationGuard::new();

        let cached = if cache_enabled {
            self.ctx.read::<Vec<R>>(&key).await?
        } else {
            None
        };

        let outcome = match cached {
            Some(records) => ResolutionOutcome::cached(records),
            None => {
                if cache_enabled {
                    guard.ensure_populated(&self.ctx, self.ctx.keys()).await?;
                }

                let mut records = self
                    .ctx
                    .fetch(&RecordQuery::matching(query.filter.clone()))
                    .await?;
                service.sort(&mut records);

                if cache_enabled && self.ctx.is_cache_eligible() {
                    self.ctx.write(&key, &records).await?;
                }

                ResolutionOutcome::fetched(records)
            }
        };

        let resident = ResidentSet::build(outcome.value.clone(), service.as_ref())?;
        self.resident = Some((key, resident));

        Ok(outcome)
    }
}

#[async_trait]
impl<R: Record> AliasResolver<R> for KeyedCacheResolver<R> {
    async fn by_alias(
        &mut self,
        alias: &str,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let mut guard = InitializationGuard::new();
        let unfiltered = self.ctx.keys().build(None, &FilterSpec::new());
        let resident = self.resident_for(&unfiltered);

        let resolved =
            resolve_primary_key_by_alias(&self.ctx, resident, &mut guard, alias).await?;

        let Some(id) = resolved.value else {
            return Ok(ResolutionOutcome::new(None, resolved.from_cache));
        };

        let record = match resident {
            Some(resident) => ResolutionOutcome::cached(resident.find(&id).cloned()),
            None => self.record_by_id(&id, &mut guard).await?,
        };

        let from_cache = resolved.from_cache && record.from_cache;
        let record = match record.value {
            Some(record) if predicate.matches(&record, filter)? => Some(record),
            _ => None,
        };

        Ok(ResolutionOutcome::new(record, from_cache))
    }
}

#[async_trait]
impl<R: Record> IdResolver<R> for KeyedCacheResolver<R> {
    async fn by_ids(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let cache_enabled = self.ctx.scope().cache_enabled;
        self.by_ids_with_cache(ids, filter, cache_enabled).await
    }

    async fn by_ids_with_cache(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let loaded = self.materialize(cache_enabled).await?;
        let records = loaded.value.by_ids(ids, filter, &predicate)?;

        Ok(ResolutionOutcome::new(records, loaded.from_cache))
    }
}

#[async_trait]
impl<R: Record> FilterResolver<R> for KeyedCacheResolver<R> {
    async fn by_expression(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        let predicate = self.ctx.predicate()?;
        let service = self.ctx.service()?.clone();
        let cache_enabled = self.ctx.scope().cache_enabled;
        let loaded = self.materialize(cache_enabled).await?;
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
        let cache_enabled = self.ctx.scope().cache_enabled;
        let loaded = self.materialize(cache_enabled).await?;
        let records = loaded.value.filter_multi(filter, &predicate, service.as_ref())?;

        Ok(ResolutionOutcome::new(records, loaded.from_cache))
    }
}
