//! Cache Backend Module
//!
//! The mapping a [`CacheStore`](crate::cache::CacheStore) keeps its entries in.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::cache::CacheEntry;

// == Backend Trait ==
/// Mapping-like storage for cache entries.
///
/// A store may be built on any implementation, which is how callers plug in
/// their own map. Backends that cannot be emptied return `false` from
/// [`supports_clear`](Backend::supports_clear); clearing such a store is a
/// silent no-op.
pub trait Backend<K, R>: Send {
    fn get(&self, key: &K) -> Option<&CacheEntry<R>>;

    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts an entry, returning the one it replaced.
    fn insert(&mut self, key: K, entry: CacheEntry<R>) -> Option<CacheEntry<R>>;

    fn remove(&mut self, key: &K) -> Option<CacheEntry<R>>;

    /// Visits every stored entry.
    fn for_each(&self, f: &mut dyn FnMut(&K, &CacheEntry<R>));

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn supports_clear(&self) -> bool {
        true
    }

    fn clear(&mut self);
}

// == HashMap Backend ==
impl<K, R> Backend<K, R> for HashMap<K, CacheEntry<R>>
where
    K: Eq + Hash + Send,
    R: Send,
{
    fn get(&self, key: &K) -> Option<&CacheEntry<R>> {
        HashMap::get(self, key)
    }

    fn insert(&mut self, key: K, entry: CacheEntry<R>) -> Option<CacheEntry<R>> {
        HashMap::insert(self, key, entry)
    }

    fn remove(&mut self, key: &K) -> Option<CacheEntry<R>> {
        HashMap::remove(self, key)
    }

    fn for_each(&self, f: &mut dyn FnMut(&K, &CacheEntry<R>)) {
        for (key, entry) in self.iter() {
            f(key, entry);
        }
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }
}

// == BTreeMap Backend ==
/// Ordered backend, for key types that implement `Ord` but not `Hash`.
impl<K, R> Backend<K, R> for BTreeMap<K, CacheEntry<R>>
where
    K: Ord + Send,
    R: Send,
{
    fn get(&self, key: &K) -> Option<&CacheEntry<R>> {
        BTreeMap::get(self, key)
    }

    fn insert(&mut self, key: K, entry: CacheEntry<R>) -> Option<CacheEntry<R>> {
        BTreeMap::insert(self, key, entry)
    }

    fn remove(&mut self, key: &K) -> Option<CacheEntry<R>> {
        BTreeMap::remove(self, key)
    }

    fn for_each(&self, f: &mut dyn FnMut(&K, &CacheEntry<R>)) {
        for (key, entry) in self.iter() {
            f(key, entry);
        }
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }
}
