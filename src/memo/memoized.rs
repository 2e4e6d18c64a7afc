//! Memoized Wrapper
//!
//! The callable handle returned by a [`MemoBuilder`](crate::MemoBuilder): it
//! derives a key, serves live entries and computes the rest.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{CacheStats, CacheStore};
use crate::error::{MemoError, Result};
use crate::keys::{CacheKey, KeyDeriver};
use crate::memo::registry::{self, WrapperId};

pub(crate) type BoxedFn<A, R> = Box<dyn Fn(A) -> anyhow::Result<R> + Send + Sync>;

struct Inner<A, R, K> {
    id: WrapperId,
    name: String,
    func: BoxedFn<A, R>,
    keys: KeyDeriver<A, K>,
    store: CacheStore<K, R>,
    max_age: Option<Duration>,
}

impl<A, R, K> Drop for Inner<A, R, K> {
    fn drop(&mut self) {
        registry::global().unregister(self.id);
    }
}

// == Memoized ==
/// A memoized function.
///
/// Clones share the same identity, configuration and store. The
/// configuration is fixed once built.
pub struct Memoized<A, R, K = CacheKey> {
    inner: Arc<Inner<A, R, K>>,
}

impl<A, R, K> Memoized<A, R, K>
where
    K: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    pub(crate) fn new(
        name: String,
        func: BoxedFn<A, R>,
        keys: KeyDeriver<A, K>,
        store: CacheStore<K, R>,
        max_age: Option<Duration>,
    ) -> Self {
        let id = WrapperId::next();
        registry::global().register(id, store.clearable());
        debug!(wrapper = %id, name = %name, ?max_age, "Memoized function created");

        Self {
            inner: Arc::new(Inner {
                id,
                name,
                func,
                keys,
                store,
                max_age,
            }),
        }
    }

    // == Call ==
    /// Calls the wrapped function through the cache.
    ///
    /// A live entry for the derived key is returned without invoking the
    /// function. Otherwise the function runs and a successful result is
    /// stored; failures are returned unchanged and never cached. No lock is
    /// held while the key function or the wrapped function runs.
    pub fn call(&self, args: A) -> Result<R> {
        let inner = &*self.inner;
        let key = inner.keys.derive(&args)?;

        if let Some(data) = inner.store.lookup(&key) {
            trace!(wrapper = %inner.id, "Cache hit");
            return Ok(data);
        }

        trace!(wrapper = %inner.id, "Cache miss, invoking function");
        let data = (inner.func)(args).map_err(|err| {
            debug!(wrapper = %inner.id, error = %err, "Memoized function failed");
            MemoError::Function(err)
        })?;

        inner.store.insert(key, data.clone(), inner.max_age);
        Ok(data)
    }

    // == Clear ==
    /// Aborts pending eviction timers and empties the store.
    ///
    /// A no-op if the store's backend does not support clearing. Wrappers
    /// sharing the store lose their entries too.
    pub fn clear(&self) {
        if self.inner.store.clear() {
            debug!(wrapper = %self.inner.id, "Cache cleared");
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.store.stats()
    }
}

impl<A, R, K> Memoized<A, R, K> {
    /// Identity used by [`crate::clear`].
    pub fn id(&self) -> WrapperId {
        self.inner.id
    }

    /// Display name, the wrapped closure's type name unless configured.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.inner.max_age
    }

    pub fn store(&self) -> &CacheStore<K, R> {
        &self.inner.store
    }

    /// Returns true if the key function was supplied by the caller.
    pub fn has_custom_key(&self) -> bool {
        self.inner.keys.is_custom()
    }

    /// Returns true if both handles are clones of one wrapper.
    pub fn same_wrapper(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A, R, K> Clone for Memoized<A, R, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R, K> fmt::Debug for Memoized<A, R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("max_age", &self.inner.max_age)
            .field("keys", &self.inner.keys)
            .field("store", &self.inner.store)
            .finish()
    }
}
