//! Memo Builder
//!
//! Collects the configuration of a memoized function. Anything left unset
//! falls back to the defaults: serialization-based keys, a fresh private
//! store and no expiry.

use std::hash::Hash;
use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheStore;
use crate::config::MemoOptions;
use crate::keys::{CacheKey, KeyDeriver};
use crate::memo::memoized::{BoxedFn, Memoized};

// == Memo Builder ==
/// Builder for a [`Memoized`] function.
///
/// ```ignore
/// let lookup = memoize(|id: u64| load_user(id))
///     .max_age(Duration::from_secs(30))
///     .build();
/// let user = lookup.call(7)?;
/// ```
pub struct MemoBuilder<A, R, K = CacheKey> {
    func: BoxedFn<A, R>,
    keys: KeyDeriver<A, K>,
    cache: Option<CacheStore<K, R>>,
    max_age: Option<Duration>,
    name: String,
}

impl<A, R> MemoBuilder<A, R, CacheKey>
where
    A: Serialize + 'static,
    R: 'static,
{
    /// Starts from an infallible function, keyed by the default strategy.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::from_parts(
            std::any::type_name::<F>(),
            Box::new(move |args: A| Ok::<R, anyhow::Error>(f(args))),
            KeyDeriver::default_strategy(),
        )
    }

    /// Starts from a fallible function. Its errors reach the caller as
    /// [`MemoError::Function`](crate::MemoError::Function) and are never
    /// cached.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self::from_parts(
            std::any::type_name::<F>(),
            Box::new(f),
            KeyDeriver::default_strategy(),
        )
    }
}

impl<A, R, K> MemoBuilder<A, R, K>
where
    A: 'static,
    R: 'static,
    K: 'static,
{
    /// Starts from a function and its key function, for argument types that
    /// do not implement `Serialize`.
    pub fn keyed<F, G>(f: F, key_fn: G) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        G: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self::from_parts(
            std::any::type_name::<F>(),
            Box::new(move |args: A| Ok::<R, anyhow::Error>(f(args))),
            KeyDeriver::custom(key_fn),
        )
    }

    fn from_parts(name: &str, func: BoxedFn<A, R>, keys: KeyDeriver<A, K>) -> Self {
        Self {
            func,
            keys,
            cache: None,
            max_age: None,
            name: name.to_string(),
        }
    }

    // == Key Function ==
    /// Replaces the key function. Its return value is used verbatim.
    ///
    /// The key type changes with it, so a store set earlier is discarded;
    /// call [`cache`](Self::cache) afterwards.
    pub fn cache_key<K2, G>(self, key_fn: G) -> MemoBuilder<A, R, K2>
    where
        K2: 'static,
        G: Fn(&A) -> K2 + Send + Sync + 'static,
    {
        self.with_keys(KeyDeriver::custom(key_fn))
    }

    /// Replaces the key function with a fallible one; its errors reach the
    /// caller as [`MemoError::KeyFunction`](crate::MemoError::KeyFunction).
    pub fn try_cache_key<K2, G>(self, key_fn: G) -> MemoBuilder<A, R, K2>
    where
        K2: 'static,
        G: Fn(&A) -> anyhow::Result<K2> + Send + Sync + 'static,
    {
        self.with_keys(KeyDeriver::fallible(key_fn))
    }

    fn with_keys<K2>(self, keys: KeyDeriver<A, K2>) -> MemoBuilder<A, R, K2> {
        MemoBuilder {
            func: self.func,
            keys,
            cache: None,
            max_age: self.max_age,
            name: self.name,
        }
    }

    // == Options ==
    /// Uses a caller-supplied store, shared with whoever else holds it.
    pub fn cache(mut self, store: CacheStore<K, R>) -> Self {
        self.cache = Some(store);
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn max_age_ms(self, ms: u64) -> Self {
        self.max_age(Duration::from_millis(ms))
    }

    /// Overrides the display name used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Applies options; fields they leave unset keep their current value.
    pub fn options(mut self, options: MemoOptions) -> Self {
        if let Some(max_age) = options.max_age {
            self.max_age = Some(max_age);
        }
        self
    }
}

impl<A, R, K> MemoBuilder<A, R, K>
where
    K: Eq + Hash + Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    // == Build ==
    /// Builds the memoized function and registers it.
    pub fn build(self) -> Memoized<A, R, K> {
        let store = self.cache.unwrap_or_default();
        Memoized::new(self.name, self.func, self.keys, store, self.max_age)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let memo = MemoBuilder::new(|n: u32| n + 1).build();

        assert!(memo.max_age().is_none());
        assert!(!memo.has_custom_key());
        assert!(memo.name().contains("closure"));
        assert_eq!(memo.call(1).unwrap(), 2);
    }

    #[test]
    fn test_max_age_and_name() {
        let memo = MemoBuilder::new(|n: u32| n)
            .max_age_ms(250)
            .name("identity")
            .build();

        assert_eq!(memo.max_age(), Some(Duration::from_millis(250)));
        assert_eq!(memo.name(), "identity");
    }

    #[test]
    fn test_options_only_override_set_fields() {
        let memo = MemoBuilder::new(|n: u32| n)
            .max_age_ms(100)
            .options(MemoOptions::default())
            .build();
        assert_eq!(memo.max_age(), Some(Duration::from_millis(100)));

        let memo = MemoBuilder::new(|n: u32| n)
            .options(MemoOptions::with_max_age_ms(40))
            .build();
        assert_eq!(memo.max_age(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_cache_key_changes_key_type() {
        let memo = MemoBuilder::new(|(a, b): (u32, u32)| a * b)
            .cache_key(|args: &(u32, u32)| args.0)
            .build();

        assert!(memo.has_custom_key());
        assert_eq!(memo.call((2, 3)).unwrap(), 6);
        // Same first element, served from cache
        assert_eq!(memo.call((2, 100)).unwrap(), 6);
    }

    #[test]
    fn test_keyed_without_serialize() {
        struct Opaque(u8);

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let memo = MemoBuilder::keyed(
            move |o: Opaque| {
                counter.fetch_add(1, Ordering::SeqCst);
                o.0 as u32 * 10
            },
            |o: &Opaque| o.0,
        )
        .build();

        assert_eq!(memo.call(Opaque(4)).unwrap(), 40);
        assert_eq!(memo.call(Opaque(4)).unwrap(), 40);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_supplied_cache_is_used() {
        let store = CacheStore::new();
        let memo = MemoBuilder::new(|n: u32| n * 2).cache(store.clone()).build();

        memo.call(5).unwrap();

        assert!(memo.store().ptr_eq(&store));
        assert!(store.contains(&CacheKey::Number("5".into())));
    }
}
