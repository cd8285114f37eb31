//! Materialized record collections held by a resolver

use std::collections::HashMap;

use crate::domain::record::{
    AttributePredicate, ExpressionFilter, FilterSpec, Record, RecordId, RecordService,
};
use crate::domain::DomainError;

/// A sorted collection indexed by primary key and alias
///
/// Owned by one resolver for the lifetime of a request. When two records
/// share a primary key or alias the first one wins.
#[derive(Debug, Clone)]
pub struct ResidentSet<R: Record> {
    records: Vec<R>,
    by_id: HashMap<RecordId, usize>,
    aliases: HashMap<String, RecordId>,
}

impl<R: Record> ResidentSet<R> {
    pub fn build(records: Vec<R>, service: &dyn RecordService<R>) -> Result<Self, DomainError> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut aliases = HashMap::new();

        for (index, record) in records.iter().enumerate() {
            let id = service.primary_key(record)?;

            if let Some(alias) = service.alias(record)? {
                aliases.entry(alias).or_insert_with(|| id.clone());
            }

            by_id.entry(id).or_insert(index);
        }

        Ok(Self {
            records,
            by_id,
            aliases,
        })
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    pub fn alias(&self, alias: &str) -> Option<&RecordId> {
        self.aliases.get(alias)
    }

    /// Records matching `filter`, in collection order
    pub fn matching(
        &self,
        filter: &FilterSpec,
        predicate: &AttributePredicate<R>,
    ) -> Result<Vec<R>, DomainError> {
        if filter.is_empty() {
            return Ok(self.records.clone());
        }

        let mut matched = Vec::new();
        for record in &self.records {
            if predicate.matches(record, filter)? {
                matched.push(record.clone());
            }
        }

        Ok(matched)
    }

    /// Resolves `ids` in input order, dropping misses and filtered records
    pub fn by_ids(
        &self,
        ids: &[RecordId],
        filter: &FilterSpec,
        predicate: &AttributePredicate<R>,
    ) -> Result<Vec<R>, DomainError> {
        let mut found = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(record) = self.find(id) {
                if predicate.matches(record, filter)? {
                    found.push(record.clone());
                }
            }
        }

        Ok(found)
    }

    /// Exact-equality filtering, re-sorted
    pub fn filter_multi(
        &self,
        filter: &FilterSpec,
        predicate: &AttributePredicate<R>,
        service: &dyn RecordService<R>,
    ) -> Result<Vec<R>, DomainError> {
        let mut matched = Vec::new();

        for record in &self.records {
            if predicate.matches_exact(record, filter)? {
                matched.push(record.clone());
            }
        }

        service.sort(&mut matched);
        Ok(matched)
    }

    /// Case-insensitive pattern filtering, re-sorted
    pub fn filter_expression(
        &self,
        filter: &FilterSpec,
        predicate: &AttributePredicate<R>,
        service: &dyn RecordService<R>,
    ) -> Result<Vec<R>, DomainError> {
        let expression = ExpressionFilter::compile(filter)?;
        let mut matched = Vec::new();

        for record in &self.records {
            if predicate.matches_expression(record, &expression)? {
                matched.push(record.clone());
            }
        }

        service.sort(&mut matched);
        Ok(matched)
    }
}
