use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::CacheParams;
use crate::domain::resolver::{ResolverKind, ScopeConfig};
use crate::domain::DomainError;
use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Resolver scopes by name
    #[serde(default)]
    pub scopes: HashMap<String, ScopeSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Cache store selection
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// `in_memory` or `redis`
    #[serde(default = "default_backend")]
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    #[serde(default = "default_max_ttl_secs")]
    pub max_ttl_secs: u64,
}

fn default_backend() -> String {
    "in_memory".to_string()
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_max_ttl_secs() -> u64 {
    24 * 3600
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis_url: None,
            key_prefix: None,
            max_capacity: default_max_capacity(),
            max_ttl_secs: default_max_ttl_secs(),
        }
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> Result<CacheConfig, DomainError> {
        Ok(CacheConfig {
            cache_type: self.backend.parse()?,
            redis_url: self.redis_url.clone(),
            key_prefix: self.key_prefix.clone(),
            max_ttl: Duration::from_secs(self.max_ttl_secs),
            max_capacity: self.max_capacity,
        })
    }
}

/// One resolver scope as written in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeSettings {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub store: String,
    #[serde(default)]
    pub resolver: ResolverKind,
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    #[serde(default = "default_true")]
    pub cache_eligible: bool,
    #[serde(default = "default_max_cached_page")]
    pub max_cached_page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Hints forwarded to cache reads (`strategy`, `ttl_secs`, ...)
    #[serde(default)]
    pub read_params: HashMap<String, String>,
    /// Hints forwarded to cache writes
    #[serde(default)]
    pub write_params: HashMap<String, String>,
}

fn default_namespace() -> String {
    "lookup:".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_cached_page() -> u32 {
    5
}

fn default_page_size() -> u32 {
    20
}

impl ScopeSettings {
    /// Resolves the hint bags into typed parameters
    pub fn to_scope_config(&self) -> Result<ScopeConfig, DomainError> {
        Ok(ScopeConfig::new(&self.namespace, &self.store)
            .with_cache_enabled(self.cache_enabled)
            .with_cache_eligible(self.cache_eligible)
            .with_max_cached_page(self.max_cached_page)
            .with_page_size(self.page_size)
            .with_read_params(CacheParams::from_hints(&self.read_params)?)
            .with_write_params(CacheParams::from_hints(&self.write_params)?))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LOOKUP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn scope(&self, name: &str) -> Result<&ScopeSettings, DomainError> {
        self.scopes
            .get(name)
            .ok_or_else(|| DomainError::configuration(format!("Unknown scope: {}", name)))
    }
}
