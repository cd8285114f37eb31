//! In-memory record repository

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::record::{
    AttributePredicate, Page, PageRequest, PaginationMetadata, Record, RecordId, RecordQuery,
    RecordRepository, RecordService,
};
use crate::domain::DomainError;

/// Thread-safe in-memory backing store
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryRecordRepository<R: Record> {
    records: RwLock<Vec<R>>,
    service: Arc<dyn RecordService<R>>,
    predicate: AttributePredicate<R>,
}

impl<R: Record> InMemoryRecordRepository<R> {
    /// Creates a new empty repository
    pub fn new(service: Arc<dyn RecordService<R>>) -> Self {
        Self::with_records(service, Vec::new())
    }

    /// Creates a repository pre-populated with records
    pub fn with_records(service: Arc<dyn RecordService<R>>, records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
            predicate: AttributePredicate::new(service.clone()),
            service,
        }
    }

    /// Inserts or replaces a record by primary key
    pub fn upsert(&self, record: R) -> Result<(), DomainError> {
        let id = self.service.primary_key(&record)?;
        let mut records = self.records.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut existing = None;
        for (index, candidate) in records.iter().enumerate() {
            if self.service.primary_key(candidate)? == id {
                existing = Some(index);
                break;
            }
        }

        match existing {
            Some(index) => records[index] = record,
            None => records.push(record),
        }

        Ok(())
    }

    fn matching(&self, query: &RecordQuery) -> Result<Vec<R>, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let wanted: Option<HashSet<&RecordId>> = query.ids.as_ref().map(|ids| ids.iter().collect());
        let mut result = Vec::new();

        for record in records.iter() {
            if let Some(wanted) = &wanted {
                if !wanted.contains(&self.service.primary_key(record)?) {
                    continue;
                }
            }

            if self.predicate.matches(record, &query.filter)? {
                result.push(record.clone());
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl<R: Record> RecordRepository<R> for InMemoryRecordRepository<R> {
    async fn search(&self, query: &RecordQuery) -> Result<Vec<R>, DomainError> {
        self.matching(query)
    }

    async fn search_page(
        &self,
        query: &RecordQuery,
        page: PageRequest,
    ) -> Result<Page<R>, DomainError> {
        let mut records = self.matching(query)?;
        self.service.sort(&mut records);

        let metadata = PaginationMetadata::compute(records.len() as u64, page);
        let records = records
            .into_iter()
            .skip(page.offset())
            .take(page.size as usize)
            .collect();

        Ok(Page { records, metadata })
    }

    async fn total_count(&self, query: &RecordQuery) -> Result<u64, DomainError> {
        Ok(self.matching(query)?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::mock::{product, product_service, products};
    use crate::domain::record::FilterSpec;

    fn repository() -> InMemoryRecordRepository<serde_json::Value> {
        InMemoryRecordRepository::with_records(product_service(), products())
    }

    #[tokio::test]
    async fn test_search_all() {
        let records = repository().search(&RecordQuery::all()).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_search_by_filter() {
        let query = RecordQuery::matching(FilterSpec::new().with("status", "active"));
        let records = repository().search(&query).await.unwrap();

        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_search_by_ids() {
        let query = RecordQuery::by_ids(vec![2.into(), 3.into(), 99.into()]);
        let records = repository().search(&query).await.unwrap();

        let ids: Vec<i64> = records.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_search_page() {
        let page = repository()
            .search_page(&RecordQuery::all(), PageRequest::new(2, 2))
            .await
            .unwrap();

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0]["id"], 3);
        assert_eq!(page.metadata.total_count, 3);
        assert_eq!(page.metadata.page_count, 2);
        assert_eq!(page.metadata.current_page, 2);
    }

    #[tokio::test]
    async fn test_pagination_default() {
        let metadata = repository()
            .pagination(&RecordQuery::all(), PageRequest::new(1, 2))
            .await
            .unwrap();

        assert_eq!(metadata.page_count, 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_primary_key() {
        let repository = repository();
        repository.upsert(product(2, "beta", "active")).unwrap();
        repository.upsert(product(4, "delta", "active")).unwrap();

        assert_eq!(repository.total_count(&RecordQuery::all()).await.unwrap(), 4);

        let active = RecordQuery::matching(FilterSpec::new().with("status", "active"));
        assert_eq!(repository.total_count(&active).await.unwrap(), 4);
    }

    #[test]
    fn test_upsert_into_empty_repository() {
        let repository = InMemoryRecordRepository::new(product_service());
        repository.upsert(product(7, "eta", "draft")).unwrap();

        let records = tokio_test::block_on(repository.search(&RecordQuery::all())).unwrap();

        assert_eq!(records, vec![product(7, "eta", "draft")]);
    }
}
