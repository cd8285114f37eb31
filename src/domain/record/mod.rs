//! Record domain - identifiers, filters and the collaborators that read records

mod filter;
mod predicate;
mod repository;
mod service;
mod value;

pub use filter::{FilterSpec, Requirement};
pub use predicate::{AttributePredicate, ExpressionFilter};
pub use repository::{Page, PageRequest, PaginationMetadata, RecordQuery, RecordRepository};
pub use service::{sha256_hex, Record, RecordService};
pub use value::{AttributeValue, RecordId};

#[cfg(test)]
pub mod mock;
