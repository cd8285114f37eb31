//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use self::config::MetricsConfig;
pub use self::metrics::{
    init_metrics, record_initialization_request, record_resolution, PrometheusMetrics,
};
