//! Domain layer - types and collaborator traits of the lookup engine

pub mod cache;
pub mod error;
pub mod record;
pub mod resolver;

pub use error::DomainError;
