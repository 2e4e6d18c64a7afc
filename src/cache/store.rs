//! Cache Store Module
//!
//! Shared handle over a backend, with entry lifecycle bookkeeping and
//! eviction timers.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cache::entry::deadline_after;
use crate::cache::{Backend, CacheEntry, CacheStats};
use crate::tasks::spawn_eviction_timer;

// == Store State ==
/// Everything behind the store lock.
pub(crate) struct StoreState<K, R> {
    backend: Box<dyn Backend<K, R>>,
    stats: CacheStats,
    next_generation: u64,
}

impl<K, R> StoreState<K, R> {
    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn sync_len(&mut self) {
        let len = self.backend.len();
        self.stats.set_total_entries(len);
    }

    /// Removes `key` only if it still holds the entry stamped `generation`.
    fn evict_generation(&mut self, key: &K, generation: u64) -> bool {
        let current = self
            .backend
            .get(key)
            .map(|entry| entry.generation() == generation)
            .unwrap_or(false);

        if current {
            self.backend.remove(key);
            self.stats.record_eviction();
            self.sync_len();
        }
        current
    }

    fn clear(&mut self) -> bool {
        if !self.backend.supports_clear() {
            debug!("Backend does not support clearing, ignoring clear");
            return false;
        }

        // Cancel first so no timer outlives the entries it was scheduled for
        self.backend
            .for_each(&mut |_: &K, entry: &CacheEntry<R>| entry.cancel_timer());
        self.backend.clear();
        self.stats.record_clear();
        self.sync_len();
        true
    }
}

// == Clearable ==
/// Type-erased view of a store used by the wrapper registry.
pub(crate) trait Clearable: Send + Sync {
    fn clear_entries(&self) -> bool;
}

impl<K, R> Clearable for Mutex<StoreState<K, R>>
where
    K: 'static,
    R: 'static,
{
    fn clear_entries(&self) -> bool {
        self.lock().clear()
    }
}

// == Cache Store ==
/// Memoized results of one or more wrappers.
///
/// Cloning the store yields another handle to the same entries, which is how
/// several wrappers share or pre-seed a cache.
pub struct CacheStore<K, R> {
    inner: Arc<Mutex<StoreState<K, R>>>,
}

impl<K, R> CacheStore<K, R>
where
    K: Eq + Hash + Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates an empty store backed by a `HashMap`.
    pub fn new() -> Self {
        Self::with_backend(HashMap::new())
    }
}

impl<K, R> Default for CacheStore<K, R>
where
    K: Eq + Hash + Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, R> CacheStore<K, R>
where
    K: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    /// Creates a store over a caller-supplied backend.
    ///
    /// Entries already in the backend are kept.
    pub fn with_backend<B>(backend: B) -> Self
    where
        B: Backend<K, R> + 'static,
    {
        let mut state = StoreState {
            backend: Box::new(backend),
            stats: CacheStats::new(),
            next_generation: 0,
        };
        state.sync_len();

        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    // == Seed ==
    /// Pre-seeds a result that never expires, replacing any existing entry.
    pub fn seed(&self, key: K, data: R) {
        self.insert(key, data, None);
    }

    // == Lookup ==
    /// Returns a clone of the live entry for `key`.
    ///
    /// An expired entry is removed (its timer aborted) and reported as a miss.
    pub(crate) fn lookup(&self, key: &K) -> Option<R> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        let now = Instant::now();

        let expired = match state.backend.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let data = entry.data().clone();
                state.stats.record_hit();
                return Some(data);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            if let Some(stale) = state.backend.remove(key) {
                stale.cancel_timer();
            }
            state.stats.record_expiration();
            state.sync_len();
            trace!("Dropped expired entry on lookup");
        }

        state.stats.record_miss();
        None
    }

    // == Insert ==
    /// Stores a fresh result, overwriting any entry for the same key.
    ///
    /// With a representable max age and a runtime on the calling thread, an
    /// eviction timer is scheduled. It holds only a weak reference to the
    /// store and removes the key only if this exact entry is still there.
    pub(crate) fn insert(&self, key: K, data: R, max_age: Option<Duration>) {
        let mut state = self.inner.lock();
        let generation = state.next_generation();

        // Scheduled under the lock so the timer cannot observe the store
        // before the entry lands. An age past the clock's range never expires.
        let timer = max_age
            .filter(|_| deadline_after(max_age).is_some())
            .and_then(|delay| {
                let weak = Arc::downgrade(&self.inner);
                let timer_key = key.clone();
                spawn_eviction_timer(delay, move || {
                    if let Some(inner) = weak.upgrade() {
                        if inner.lock().evict_generation(&timer_key, generation) {
                            trace!(generation, "Eviction timer removed entry");
                        }
                    }
                })
            });

        let entry = CacheEntry::new(data, max_age, generation, timer);
        if let Some(previous) = state.backend.insert(key, entry) {
            previous.cancel_timer();
        }
        state.sync_len();
    }

    // == Contains ==
    /// Returns true if a live entry exists for `key`. Does not touch stats.
    pub fn contains(&self, key: &K) -> bool {
        let state = self.inner.lock();
        state
            .backend
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Remove ==
    /// Removes the entry for `key`, returning whether one existed.
    pub fn remove(&self, key: &K) -> bool {
        let mut state = self.inner.lock();
        match state.backend.remove(key) {
            Some(entry) => {
                entry.cancel_timer();
                state.sync_len();
                true
            }
            None => false,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        let now = Instant::now();

        let mut expired_keys = Vec::new();
        state
            .backend
            .for_each(&mut |key: &K, entry: &CacheEntry<R>| {
                if entry.is_expired_at(now) {
                    expired_keys.push(key.clone());
                }
            });

        let count = expired_keys.len();
        for key in expired_keys {
            if let Some(entry) = state.backend.remove(&key) {
                entry.cancel_timer();
                state.stats.record_expiration();
            }
        }

        state.sync_len();
        count
    }

    // == Clear ==
    /// Aborts every pending eviction timer, then empties the store.
    ///
    /// Returns false, leaving the store untouched, if the backend does not
    /// support clearing.
    pub fn clear(&self) -> bool {
        self.inner.lock().clear()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut state = self.inner.lock();
        state.sync_len();
        state.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if both handles point at the same entries.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Creates a handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakCacheStore<K, R> {
        WeakCacheStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Type-erased weak view for the wrapper registry.
    pub(crate) fn clearable(&self) -> Weak<dyn Clearable> {
        let weak: Weak<Mutex<StoreState<K, R>>> = Arc::downgrade(&self.inner);
        weak
    }
}

impl<K, R> Clone for CacheStore<K, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, R> fmt::Debug for CacheStore<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("CacheStore")
            .field("entries", &state.backend.len())
            .field("stats", &state.stats)
            .finish()
    }
}

// == Weak Cache Store ==
/// Non-owning handle to a [`CacheStore`].
pub struct WeakCacheStore<K, R> {
    inner: Weak<Mutex<StoreState<K, R>>>,
}

impl<K, R> WeakCacheStore<K, R> {
    /// Returns a strong handle if the store is still alive.
    pub fn upgrade(&self) -> Option<CacheStore<K, R>> {
        self.inner.upgrade().map(|inner| CacheStore { inner })
    }
}

impl<K, R> Clone for WeakCacheStore<K, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
