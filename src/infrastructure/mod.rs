//! Infrastructure layer - cache stores, record collaborators and resolvers

pub mod cache;
pub mod initializer;
pub mod logging;
pub mod observability;
pub mod record;
pub mod repository;
pub mod resolver;
