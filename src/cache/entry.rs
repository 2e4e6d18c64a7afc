//! Cache Entry Module
//!
//! Defines one memoized result with its expiration bookkeeping.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Returns the deadline `max_age` from now.
///
/// None if there is no max age, or if it overflows the clock.
pub(crate) fn deadline_after(max_age: Option<Duration>) -> Option<Instant> {
    max_age.and_then(|age| Instant::now().checked_add(age))
}

// == Cache Entry ==
/// A single memoized result.
///
/// Entries are never updated in place: a fresh computation replaces the whole
/// entry. The `generation` stamp identifies this exact instance so a late
/// eviction timer cannot remove a newer entry stored under the same key.
#[derive(Debug)]
pub struct CacheEntry<R> {
    /// The memoized value
    data: R,
    /// Deadline after which the entry is stale, None = never expires
    expires_at: Option<Instant>,
    /// Wall-clock creation time
    created_at: DateTime<Utc>,
    /// Store-unique stamp of this entry instance
    generation: u64,
    /// Pending eviction timer, if one was scheduled
    timer: Option<AbortHandle>,
}

impl<R> CacheEntry<R> {
    // == Constructor ==
    /// Creates an entry expiring `max_age` from now.
    ///
    /// A max age too large to represent as a deadline never expires.
    pub(crate) fn new(
        data: R,
        max_age: Option<Duration>,
        generation: u64,
        timer: Option<AbortHandle>,
    ) -> Self {
        Self {
            data,
            expires_at: deadline_after(max_age),
            created_at: Utc::now(),
            generation,
            timer,
        }
    }

    // == Accessors ==
    /// Returns the memoized value.
    pub fn data(&self) -> &R {
        &self.data
    }

    /// Returns the expiration deadline, None if the entry never expires.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Returns when the entry was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the store-unique stamp of this entry.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Has Timer ==
    /// Returns true if an eviction timer was scheduled for this entry.
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: the entry is expired once the current time is
    /// greater than or equal to its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Is Expired At ==
    /// Checks expiry against a given instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    // == Cancel Timer ==
    /// Aborts the pending eviction timer, if any.
    pub(crate) fn cancel_timer(&self) {
        if let Some(timer) = &self.timer {
            timer.abort();
        }
    }
}
