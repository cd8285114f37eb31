//! Hands initialization requests to a background worker

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::cache::{CacheKeyBuilder, StorageInitializer};
use crate::domain::DomainError;

/// Queues scopes for a worker task that runs an inner initializer
///
/// Requests return as soon as the scope is queued. Failures of the inner
/// initializer are logged by the worker and never reach the caller.
///
/// Dropping the initializer closes the queue; the worker still drains the
/// scopes already queued before it exits. Use [`DeferredInitializer::shutdown`]
/// to wait for that drain.
#[derive(Debug)]
pub struct DeferredInitializer {
    sender: mpsc::UnboundedSender<CacheKeyBuilder>,
    worker: JoinHandle<()>,
}

impl DeferredInitializer {
    /// Spawns the worker on the current tokio runtime
    pub fn spawn(inner: Arc<dyn StorageInitializer>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<CacheKeyBuilder>();

        let worker = tokio::spawn(async move {
            while let Some(scope) = receiver.recv().await {
                match inner.request_initialization(&scope).await {
                    Ok(accepted) => {
                        tracing::debug!(
                            store = %scope,
                            accepted,
                            "Deferred initialization finished"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            store = %scope,
                            error = %e,
                            "Deferred initialization failed"
                        );
                    }
                }
            }

            tracing::debug!("Initialization queue closed");
        });

        Self { sender, worker }
    }

    /// Whether the worker task has stopped
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Closes the queue and waits until every queued scope was handled
    pub async fn shutdown(self) -> Result<(), DomainError> {
        let Self { sender, worker } = self;
        drop(sender);

        worker
            .await
            .map_err(|e| DomainError::cache(format!("Initialization worker failed: {}", e)))
    }
}

#[async_trait]
impl StorageInitializer for DeferredInitializer {
    async fn request_initialization(&self, scope: &CacheKeyBuilder) -> Result<bool, DomainError> {
        self.sender
            .send(scope.clone())
            .map_err(|_| DomainError::cache("Initialization worker has stopped"))?;

        tracing::debug!(store = %scope, "Initialization queued");
        Ok(true)
    }
}
