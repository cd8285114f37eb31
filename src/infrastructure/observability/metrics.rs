//! Prometheus metrics infrastructure

use std::sync::Arc;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for rendering the scrape payload
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("lookup_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Record one resolver call and whether it avoided the backing store
pub fn record_resolution(store: &str, operation: &str, from_cache: bool) {
    let labels = [
        ("store", store.to_string()),
        ("operation", operation.to_string()),
        ("source", source_label(from_cache).to_string()),
    ];

    counter!("lookup_resolutions_total", &labels).increment(1);
}

/// Record a storage-initialization request
pub fn record_initialization_request(store: &str, accepted: bool) {
    let labels = [
        ("store", store.to_string()),
        ("accepted", accepted.to_string()),
    ];

    counter!("lookup_initialization_requests_total", &labels).increment(1);
}

fn source_label(from_cache: bool) -> &'static str {
    if from_cache {
        "cache"
    } else {
        "store"
    }
}
