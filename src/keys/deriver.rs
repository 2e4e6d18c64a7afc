//! Key Deriver Module
//!
//! Turns a call's arguments into a cache key, either with the default
//! strategy or a caller-supplied function.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{MemoError, Result};
use crate::keys::CacheKey;

type KeyFn<A, K> = Arc<dyn Fn(&A) -> Result<K> + Send + Sync>;

// == Key Deriver ==
/// Computes the cache key for an argument value.
///
/// The returned key is used verbatim; custom functions are trusted to return
/// something usable as a map key.
pub struct KeyDeriver<A, K> {
    key_fn: KeyFn<A, K>,
    custom: bool,
}

impl<A> KeyDeriver<A, CacheKey>
where
    A: Serialize + 'static,
{
    /// The default strategy, see [`CacheKey::from_args`].
    pub fn default_strategy() -> Self {
        Self {
            key_fn: Arc::new(|args: &A| CacheKey::from_args(args)),
            custom: false,
        }
    }
}

impl<A, K> KeyDeriver<A, K>
where
    A: 'static,
    K: 'static,
{
    /// Wraps an infallible custom key function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self {
            key_fn: Arc::new(move |args: &A| Ok(f(args))),
            custom: true,
        }
    }

    /// Wraps a fallible custom key function; its errors surface as
    /// [`MemoError::KeyFunction`].
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&A) -> anyhow::Result<K> + Send + Sync + 'static,
    {
        Self {
            key_fn: Arc::new(move |args: &A| f(args).map_err(MemoError::KeyFunction)),
            custom: true,
        }
    }
}

impl<A, K> KeyDeriver<A, K> {
    // == Derive ==
    /// Derives the key for one call.
    pub fn derive(&self, args: &A) -> Result<K> {
        (self.key_fn)(args)
    }

    /// Returns true if a caller-supplied function is in use.
    pub fn is_custom(&self) -> bool {
        self.custom
    }
}

impl<A, K> Clone for KeyDeriver<A, K> {
    fn clone(&self) -> Self {
        Self {
            key_fn: Arc::clone(&self.key_fn),
            custom: self.custom,
        }
    }
}

impl<A, K> fmt::Debug for KeyDeriver<A, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDeriver")
            .field("custom", &self.custom)
            .finish()
    }
}
