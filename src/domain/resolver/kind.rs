use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Lookup strategy of a scope, chosen once at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Iterate a materialized collection, no cache
    InMemory,
    /// Cache the whole collection plus an alias index
    #[default]
    Keyed,
    /// Cache identifier-scoped chunks of a large collection
    Chunked,
    /// Cache page id lists and pagination metadata
    Paginated,
}

impl std::fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => write!(f, "in_memory"),
            Self::Keyed => write!(f, "keyed"),
            Self::Chunked => write!(f, "chunked"),
            Self::Paginated => write!(f, "paginated"),
        }
    }
}

impl std::str::FromStr for ResolverKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "keyed" => Ok(Self::Keyed),
            "chunked" => Ok(Self::Chunked),
            "paginated" | "paged" => Ok(Self::Paginated),
            _ => Err(DomainError::configuration(format!(
                "Unknown resolver kind: {}. Valid kinds: in_memory, keyed, chunked, paginated",
                s
            ))),
        }
    }
}
