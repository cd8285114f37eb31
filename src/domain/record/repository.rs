//! Backing store capability

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

use super::filter::FilterSpec;
use super::service::Record;
use super::value::RecordId;

/// Query forwarded to the backing store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Attribute filter applied by the store
    pub filter: FilterSpec,
    /// Restricts the result to these identifiers when set
    pub ids: Option<Vec<RecordId>>,
}

impl RecordQuery {
    /// Every record of the store
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(filter: FilterSpec) -> Self {
        Self { filter, ids: None }
    }

    pub fn by_ids(ids: Vec<RecordId>) -> Self {
        Self {
            filter: FilterSpec::new(),
            ids: Some(ids),
        }
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }
}

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size,
        }
    }

    /// Index of the first record of the page
    pub fn offset(&self) -> usize {
        (self.number.saturating_sub(1) as usize) * self.size as usize
    }
}

/// Pagination metadata captured alongside a page of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub total_count: u64,
    pub page_size: u32,
    pub page_count: u32,
    pub current_page: u32,
}

impl PaginationMetadata {
    pub fn compute(total_count: u64, page: PageRequest) -> Self {
        let page_count = if page.size == 0 {
            0
        } else {
            total_count.div_ceil(page.size as u64) as u32
        };

        Self {
            total_count,
            page_size: page.size,
            page_count,
            current_page: page.number,
        }
    }
}

/// One page of records plus its metadata
#[derive(Debug, Clone)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub metadata: PaginationMetadata,
}

/// Authoritative source of records
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync + Debug {
    /// Returns every record matching the query
    async fn search(&self, query: &RecordQuery) -> Result<Vec<R>, DomainError>;

    /// Returns one page of matching records with its metadata
    async fn search_page(&self, query: &RecordQuery, page: PageRequest)
        -> Result<Page<R>, DomainError>;

    /// Number of records matching the query
    async fn total_count(&self, query: &RecordQuery) -> Result<u64, DomainError>;

    /// Fresh pagination metadata without loading records
    async fn pagination(
        &self,
        query: &RecordQuery,
        page: PageRequest,
    ) -> Result<PaginationMetadata, DomainError> {
        let total = self.total_count(query).await?;
        Ok(PaginationMetadata::compute(total, page))
    }
}
