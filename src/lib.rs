//! Tiered Lookup
//!
//! Cache-first record resolution with backing store fallback:
//! - Four resolver strategies (in-memory, keyed, chunked, paginated)
//! - Deterministic cache keys per scope, filter and identifier
//! - Alias-to-primary-key resolution through a cached index
//! - Storage-initialization signalling for cold scopes
//! - In-memory (moka) and Redis cache backends

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use self::config::AppConfig;
pub use domain::DomainError;
pub use domain::cache::{Cache, CacheExt, CacheKeyBuilder, StorageInitializer};
pub use domain::record::{FilterSpec, RecordId, RecordQuery, RecordRepository, RecordService};
pub use domain::resolver::{ResolutionOutcome, ResolverKind, ScopeConfig};
pub use infrastructure::resolver::{AnyResolver, ResolverContext};
