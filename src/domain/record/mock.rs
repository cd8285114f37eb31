//! Test fixtures for record collaborators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::DomainError;
use crate::infrastructure::record::JsonRecordService;
use crate::infrastructure::repository::InMemoryRecordRepository;

use super::{Page, PageRequest, RecordQuery, RecordRepository, RecordService};

/// Accessor for the `Value` products used throughout the tests
pub fn product_service() -> Arc<dyn RecordService<Value>> {
    Arc::new(
        JsonRecordService::new("id")
            .with_alias_field("slug")
            .with_sort_field("id")
            .with_attributes(["id", "slug", "status", "name", "brand", "stock"]),
    )
}

pub fn product(id: i64, slug: &str, status: &str) -> Value {
    json!({"id": id, "slug": slug, "status": status, "name": format!("Product {}", id)})
}

pub fn products() -> Vec<Value> {
    vec![
        product(3, "gamma", "active"),
        product(1, "alpha", "active"),
        product(2, "beta", "draft"),
    ]
}

/// Backing store that counts every call it receives
#[derive(Debug)]
pub struct CountingRepository {
    inner: InMemoryRecordRepository<Value>,
    search_calls: AtomicUsize,
    page_calls: AtomicUsize,
    pagination_calls: AtomicUsize,
    queries: Mutex<Vec<RecordQuery>>,
    error: Mutex<Option<String>>,
}

impl CountingRepository {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            inner: InMemoryRecordRepository::with_records(product_service(), records),
            search_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            pagination_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            error: Mutex::new(None),
        }
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        *self.error.lock().unwrap() = Some(error.into());
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn pagination_calls(&self) -> usize {
        self.pagination_calls.load(Ordering::SeqCst)
    }

    /// Total number of calls of any kind
    pub fn calls(&self) -> usize {
        self.search_calls() + self.page_calls() + self.pagination_calls()
    }

    pub fn last_query(&self) -> Option<RecordQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    fn check_error(&self) -> Result<(), DomainError> {
        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(DomainError::storage(error));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordRepository<Value> for CountingRepository {
    async fn search(&self, query: &RecordQuery) -> Result<Vec<Value>, DomainError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        self.check_error()?;
        self.inner.search(query).await
    }

    async fn search_page(
        &self,
        query: &RecordQuery,
        page: PageRequest,
    ) -> Result<Page<Value>, DomainError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        self.check_error()?;
        self.inner.search_page(query, page).await
    }

    async fn total_count(&self, query: &RecordQuery) -> Result<u64, DomainError> {
        self.check_error()?;
        self.inner.total_count(query).await
    }

    async fn pagination(
        &self,
        query: &RecordQuery,
        page: PageRequest,
    ) -> Result<super::PaginationMetadata, DomainError> {
        self.pagination_calls.fetch_add(1, Ordering::SeqCst);
        self.check_error()?;
        self.inner.pagination(query, page).await
    }
}
