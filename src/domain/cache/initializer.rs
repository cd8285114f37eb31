//! Storage-initialization signal

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

use super::key::CacheKeyBuilder;

/// Requests that an empty cache scope be (re)populated
///
/// Implementations may populate inline before returning or hand the work
/// to a background worker. Callers only rely on the call returning
/// promptly; the boolean reports whether the request was accepted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StorageInitializer: Send + Sync + Debug {
    async fn request_initialization(&self, scope: &CacheKeyBuilder) -> Result<bool, DomainError>;
}
