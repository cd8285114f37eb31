//! Resolver domain - lookup strategies and their shared vocabulary

mod kind;
mod outcome;
mod scope;
mod traits;

pub use kind::ResolverKind;
pub use outcome::{ListQuery, ResolutionOutcome};
pub use scope::ScopeConfig;
pub use traits::{AliasResolver, FilterResolver, IdResolver, ListResolver};
