//! Attribute predicates shared by every lookup path

use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::domain::DomainError;

use super::filter::FilterSpec;
use super::service::{Record, RecordService};

/// Evaluates filters against records through the accessor capability
#[derive(Debug, Clone)]
pub struct AttributePredicate<R: Record> {
    service: Arc<dyn RecordService<R>>,
}

impl<R: Record> AttributePredicate<R> {
    pub fn new(service: Arc<dyn RecordService<R>>) -> Self {
        Self { service }
    }

    /// Every required attribute is present and one of the acceptable values
    ///
    /// Short-circuits on the first failing entry. An absent attribute fails
    /// even when the filter accepts `Null`.
    pub fn matches(&self, record: &R, filter: &FilterSpec) -> Result<bool, DomainError> {
        for (name, requirement) in filter.iter() {
            let value = match self.service.attribute(record, name)? {
                Some(value) if !value.is_absent() => value,
                _ => return Ok(false),
            };

            if !requirement.acceptable().contains(&value) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Exact equality, skipping entries whose filter value is `false` or null
    pub fn matches_exact(&self, record: &R, filter: &FilterSpec) -> Result<bool, DomainError> {
        for (name, requirement) in filter.iter() {
            if requirement.is_ignored() {
                continue;
            }

            let value = match self.service.attribute(record, name)? {
                Some(value) => value,
                None => return Ok(false),
            };

            if !requirement.acceptable().contains(&value) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Case-insensitive pattern match of every compiled condition
    pub fn matches_expression(
        &self,
        record: &R,
        expression: &ExpressionFilter,
    ) -> Result<bool, DomainError> {
        for (name, patterns) in &expression.conditions {
            let text = match self.service.attribute(record, name)? {
                Some(value) if !value.is_absent() => value.as_text(),
                _ => return Ok(false),
            };

            if !patterns.iter().any(|pattern| pattern.is_match(&text)) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// A filter whose values were compiled into case-insensitive patterns
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    conditions: Vec<(String, Vec<Regex>)>,
}

impl ExpressionFilter {
    /// Compiles each filter value once; `false` and null entries are dropped
    pub fn compile(filter: &FilterSpec) -> Result<Self, DomainError> {
        let mut conditions = Vec::with_capacity(filter.len());

        for (name, requirement) in filter.iter() {
            if requirement.is_ignored() {
                continue;
            }

            let patterns = requirement
                .acceptable()
                .iter()
                .map(|value| {
                    RegexBuilder::new(&value.as_text())
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| {
                            DomainError::validation(format!(
                                "Invalid pattern for attribute '{}': {}",
                                name, e
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            conditions.push((name.to_string(), patterns));
        }

        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
