//! Memo Cache - Function memoization with time-based expiry
//!
//! Wraps a function so repeated calls with equal arguments are answered from
//! a cache. Keys are derived from the arguments (or by a custom function),
//! and entries may expire after a max age.
//!
//! ```ignore
//! use std::time::Duration;
//!
//! let slow_square = memo_cache::memoize(|n: u64| n * n)
//!     .max_age(Duration::from_millis(500))
//!     .build();
//!
//! assert_eq!(slow_square.call(12)?, 144); // computed
//! assert_eq!(slow_square.call(12)?, 144); // cached
//!
//! memo_cache::clear(slow_square.id());
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod memo;
pub mod tasks;

use serde::Serialize;

pub use cache::{CacheStats, CacheStore};
pub use config::MemoOptions;
pub use error::{MemoError, Result};
pub use keys::CacheKey;
pub use memo::{MemoBuilder, Memoized, WrapperId};
pub use tasks::spawn_cleanup_task;

/// Starts memoizing an infallible function.
///
/// Finish with [`MemoBuilder::build`]; the defaults derive keys from the
/// serialized arguments, use a private store and never expire entries.
pub fn memoize<A, R, F>(f: F) -> MemoBuilder<A, R>
where
    A: Serialize + 'static,
    R: 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    MemoBuilder::new(f)
}

/// Starts memoizing a fallible function. Failed calls are never cached.
pub fn try_memoize<A, R, F>(f: F) -> MemoBuilder<A, R>
where
    A: Serialize + 'static,
    R: 'static,
    F: Fn(A) -> anyhow::Result<R> + Send + Sync + 'static,
{
    MemoBuilder::fallible(f)
}

/// Clears the cache of the wrapper identified by `id`.
///
/// Pending eviction timers are aborted before the store is emptied. Unknown
/// ids, dropped wrappers and stores that cannot be cleared are ignored.
pub fn clear(id: WrapperId) {
    memo::registry::global().clear(id);
}

/// Returns true if `id` belongs to a live memoized wrapper.
pub fn is_memoized(id: WrapperId) -> bool {
    memo::registry::global().contains(id)
}
