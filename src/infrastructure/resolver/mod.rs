//! Resolver implementations

mod alias;
mod any;
mod chunked;
mod context;
mod in_memory;
mod keyed;
mod paginated;
mod resident;

pub use alias::resolve_primary_key_by_alias;
pub use any::AnyResolver;
pub use chunked::ChunkedCacheResolver;
pub use context::{InitializationGuard, ResolverContext};
pub use in_memory::InMemoryResolver;
pub use keyed::KeyedCacheResolver;
pub use paginated::PaginatedCacheResolver;
pub use resident::ResidentSet;
