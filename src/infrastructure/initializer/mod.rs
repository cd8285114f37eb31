//! Storage-initialization signal implementations

mod coalescing;
mod deferred;
mod inline;

pub use coalescing::CoalescingInitializer;
pub use deferred::DeferredInitializer;
pub use inline::InlineInitializer;
