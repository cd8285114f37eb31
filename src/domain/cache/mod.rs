//! Cache domain - key derivation, store abstraction and population signal

mod initializer;
mod key;
mod params;
mod repository;

pub use initializer::StorageInitializer;
pub use key::{CacheKeyBuilder, Discriminator};
pub use params::{CacheParams, ReadStrategy, REFRESH_TTL_HINT};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use initializer::MockStorageInitializer;
#[cfg(test)]
pub use repository::mock::MockCache;
