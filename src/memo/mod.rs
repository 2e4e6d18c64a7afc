//! Memo Module
//!
//! Wraps functions with a cache keyed by their arguments.
//!
//! # Flow
//! - The key deriver turns the arguments into a cache key
//! - A live entry for the key is returned as-is
//! - Otherwise the function runs and its result is stored with its deadline

mod builder;
mod memoized;
pub(crate) mod registry;

pub use builder::MemoBuilder;
pub use memoized::Memoized;
pub use registry::WrapperId;
