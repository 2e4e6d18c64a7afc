//! Wrapper Registry
//!
//! Process-wide weak association from wrapper identity to its store, so a
//! cache can be cleared by id alone.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::Clearable;

static GLOBAL: Lazy<WrapperRegistry> = Lazy::new(WrapperRegistry::new);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Returns the registry every wrapper is registered in.
pub(crate) fn global() -> &'static WrapperRegistry {
    &GLOBAL
}

// == Wrapper Id ==
/// Identity of one memoized wrapper, shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WrapperId(u64);

impl WrapperId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds an id from its raw value. Ids that were never issued, or
    /// whose wrapper has been dropped, are simply unknown to the registry.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WrapperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memo#{}", self.0)
    }
}

// == Wrapper Registry ==
/// Maps wrapper ids to weak store references.
///
/// Never an ownership edge: a registered store is freed as soon as its last
/// strong handle goes away, and wrappers unregister themselves on drop.
pub(crate) struct WrapperRegistry {
    stores: Mutex<HashMap<WrapperId, Weak<dyn Clearable>>>,
}

impl WrapperRegistry {
    pub(crate) fn new() -> Self {
        Self {
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn register(&self, id: WrapperId, store: Weak<dyn Clearable>) {
        self.stores.lock().insert(id, store);
        trace!(wrapper = %id, "Registered wrapper");
    }

    pub(crate) fn unregister(&self, id: WrapperId) -> bool {
        let removed = self.stores.lock().remove(&id).is_some();
        if removed {
            trace!(wrapper = %id, "Unregistered wrapper");
        }
        removed
    }

    /// Returns true if `id` belongs to a live wrapper.
    pub(crate) fn contains(&self, id: WrapperId) -> bool {
        self.stores
            .lock()
            .get(&id)
            .map(|store| store.strong_count() > 0)
            .unwrap_or(false)
    }

    // == Clear ==
    /// Clears the store registered for `id`.
    ///
    /// Returns true only if a store was found and its backend supported
    /// clearing. Unknown ids and dead stores are a silent no-op.
    pub(crate) fn clear(&self, id: WrapperId) -> bool {
        // Upgrade under the registry lock, clear outside it
        let store = {
            let mut stores = self.stores.lock();
            match stores.get(&id).map(Weak::upgrade) {
                Some(Some(store)) => store,
                Some(None) => {
                    stores.remove(&id);
                    debug!(wrapper = %id, "Pruned dead registry entry");
                    return false;
                }
                None => {
                    trace!(wrapper = %id, "Clear requested for unknown wrapper");
                    return false;
                }
            }
        };

        store.clear_entries()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.stores.lock().len()
    }
}
