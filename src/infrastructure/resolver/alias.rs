//! Alias to primary key indirection

use crate::domain::cache::Discriminator;
use crate::domain::record::{FilterSpec, Record, RecordId, RecordQuery};
use crate::domain::resolver::ResolutionOutcome;
use crate::domain::DomainError;

use super::context::{InitializationGuard, ResolverContext};
use super::resident::ResidentSet;

/// Resolves an alias to the primary key of its record
///
/// Order of sources: the resident alias map, the alias index in the cache,
/// then the backing store. A store hit is written to the alias index when
/// the scope is cache-eligible. In an eligible scope whose alias index is
/// populated, a cache miss means the alias does not exist.
pub async fn resolve_primary_key_by_alias<R: Record>(
    ctx: &ResolverContext<R>,
    resident: Option<&ResidentSet<R>>,
    guard: &mut InitializationGuard,
    alias: &str,
) -> Result<ResolutionOutcome<Option<RecordId>>, DomainError> {
    if let Some(resident) = resident {
        return Ok(ResolutionOutcome::cached(resident.alias(alias).cloned()));
    }

    let service = ctx.service()?;
    let caching = ctx.scope().cache_enabled;
    let alias_keys = ctx.keys().alias_scope();
    let key = alias_keys.build(
        Some(&Discriminator::Alias(service.hash(alias))),
        &FilterSpec::new(),
    );

    if caching {
        if let Some(id) = ctx.read::<RecordId>(&key).await? {
            return Ok(ResolutionOutcome::cached(Some(id)));
        }

        if ctx.is_cache_eligible() && guard.ensure_populated(ctx, &alias_keys).await? {
            return Ok(ResolutionOutcome::cached(None));
        }
    }

    let query = RecordQuery::matching(FilterSpec::new().with(service.alias_attribute(), alias));
    let Some(record) = ctx.fetch(&query).await?.into_iter().next() else {
        return Ok(ResolutionOutcome::fetched(None));
    };

    let id = service.primary_key(&record)?;

    if caching && ctx.is_cache_eligible() {
        ctx.write(&key, &id).await?;
    }

    Ok(ResolutionOutcome::fetched(Some(id)))
}
