//! Background Tasks Module
//!
//! Tasks that run on the tokio runtime alongside memoized calls.
//!
//! # Tasks
//! - Eviction timer: one-shot removal of a single entry after its max age
//! - Expiry sweep: periodic removal of every expired entry in a store

mod cleanup;
mod expiry;

pub use cleanup::spawn_cleanup_task;
pub use expiry::spawn_eviction_timer;
