//! Lookup strategy traits
//!
//! Each resolver implements only the operations its strategy supports.

use async_trait::async_trait;

use crate::domain::record::{FilterSpec, Record, RecordId};
use crate::domain::DomainError;

use super::outcome::{ListQuery, ResolutionOutcome};

/// Full or page-scoped listings
#[async_trait]
pub trait ListResolver<R: Record>: Send {
    async fn list(
        &mut self,
        query: &ListQuery,
        cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError>;
}

/// Lookups by primary identifier
#[async_trait]
pub trait IdResolver<R: Record>: Send {
    /// Resolves the identifiers in input order, dropping misses
    async fn by_ids(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError>;

    /// Like `by_ids`, with the cache tier switched on or off for this call
    ///
    /// Resolvers without a cache tier ignore the flag.
    async fn by_ids_with_cache(
        &mut self,
        ids: &[RecordId],
        filter: &FilterSpec,
        _cache_enabled: bool,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError> {
        self.by_ids(ids, filter).await
    }

    async fn by_id(
        &mut self,
        id: &RecordId,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let outcome = self.by_ids(std::slice::from_ref(id), filter).await?;
        Ok(outcome.map(|records| records.into_iter().next()))
    }
}

/// Lookups by human-facing alias
#[async_trait]
pub trait AliasResolver<R: Record>: Send {
    async fn by_alias(
        &mut self,
        alias: &str,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError>;
}

/// Attribute-filtered lookups over a full listing
#[async_trait]
pub trait FilterResolver<R: Record>: Send {
    /// Case-insensitive pattern match per attribute
    async fn by_expression(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError>;

    /// Exact match per attribute
    async fn by_multi(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Vec<R>>, DomainError>;

    /// First exact match
    async fn by(
        &mut self,
        filter: &FilterSpec,
    ) -> Result<ResolutionOutcome<Option<R>>, DomainError> {
        let outcome = self.by_multi(filter).await?;
        Ok(outcome.map(|records| records.into_iter().next()))
    }
}
