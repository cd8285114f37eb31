//! Record accessor capability

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

use super::value::{AttributeValue, RecordId};

/// Types that can flow through the resolvers and be stored in the cache
pub trait Record: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {}

impl<T> Record for T where
    T: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

/// Extracts attributes and identifiers from domain records
///
/// Resolvers never look inside a record themselves; everything they need
/// goes through this trait.
pub trait RecordService<R>: Send + Sync + Debug {
    /// Reads an attribute; `Ok(None)` when the record has no value for it
    fn attribute(&self, record: &R, name: &str) -> Result<Option<AttributeValue>, DomainError>;

    /// Primary identifier of the record
    fn primary_key(&self, record: &R) -> Result<RecordId, DomainError>;

    /// Name of the attribute that holds the human-facing alias
    fn alias_attribute(&self) -> &str;

    /// Alias value of the record, if it has one
    fn alias(&self, record: &R) -> Result<Option<String>, DomainError> {
        Ok(self
            .attribute(record, self.alias_attribute())?
            .filter(|value| !value.is_absent())
            .map(|value| value.as_text())
            .filter(|alias| !alias.is_empty()))
    }

    /// Stable hash used to keep free-form values out of cache keys
    fn hash(&self, value: &str) -> String {
        sha256_hex(value)
    }

    /// Post-fetch shaping of a record loaded from the backing store
    fn normalize(&self, record: R) -> R {
        record
    }

    /// Orders a result set the way listings are presented
    fn sort(&self, _records: &mut Vec<R>) {}
}

/// Hex encoded SHA-256 digest
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
