//! Cache Module
//!
//! Storage for memoized results with time-based expiry.

mod backend;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::Backend;
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{CacheStore, WeakCacheStore};

pub(crate) use store::Clearable;
