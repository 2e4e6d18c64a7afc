//! Cache Statistics Module
//!
//! Tracks memoization metrics including hits, misses, and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics for one store.
///
/// A store shared by several wrappers aggregates all of their calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that had to invoke the wrapped function
    pub misses: u64,
    /// Stale entries dropped on lookup or by a sweep
    pub expirations: u64,
    /// Entries removed by their eviction timer
    pub evictions: u64,
    /// Number of times the store was cleared
    pub clears: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no calls have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expiration ==
    /// Counts a stale entry dropped on lookup or by a sweep.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Eviction ==
    /// Counts an entry removed by its eviction timer.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Clear ==
    /// Increments the clear counter.
    pub fn record_clear(&mut self) {
        self.clears += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
