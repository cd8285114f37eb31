//! Per-scope cache configuration

use crate::domain::cache::{CacheKeyBuilder, CacheParams};

/// Cache behaviour of one resolver scope
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeConfig {
    /// Key namespace prefix, e.g. `shop:`
    pub namespace: String,
    /// Store prefix, e.g. `products`
    pub store: String,
    /// Whether lookups consult the cache at all
    pub cache_enabled: bool,
    /// Whether results may be written to the cache
    ///
    /// For the keyed resolver an eligible, populated scope is authoritative:
    /// a miss there means the record does not exist.
    pub cache_eligible: bool,
    /// Highest page number written to the cache
    pub max_cached_page: u32,
    pub page_size: u32,
    pub read_params: CacheParams,
    pub write_params: CacheParams,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            namespace: "lookup:".to_string(),
            store: "records".to_string(),
            cache_enabled: true,
            cache_eligible: true,
            max_cached_page: 5,
            page_size: 20,
            read_params: CacheParams::default(),
            write_params: CacheParams::default(),
        }
    }
}

impl ScopeConfig {
    pub fn new(namespace: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            store: store.into(),
            ..Default::default()
        }
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_cache_eligible(mut self, eligible: bool) -> Self {
        self.cache_eligible = eligible;
        self
    }

    pub fn with_max_cached_page(mut self, page: u32) -> Self {
        self.max_cached_page = page;
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_read_params(mut self, params: CacheParams) -> Self {
        self.read_params = params;
        self
    }

    pub fn with_write_params(mut self, params: CacheParams) -> Self {
        self.write_params = params;
        self
    }

    pub fn key_builder(&self) -> CacheKeyBuilder {
        CacheKeyBuilder::new(&self.namespace, &self.store)
    }

    /// Whether a page may be written to the cache
    pub fn is_page_cacheable(&self, page: u32) -> bool {
        self.cache_eligible && page <= self.max_cached_page
    }
}
