//! Property-Based Tests for Memoization
//!
//! Uses proptest to verify the caching guarantees end to end.

use proptest::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::{memoize, try_memoize, CacheKey, MemoError};

// == Strategies ==
/// Generates argument tuples for a two-argument function
fn args_strategy() -> impl Strategy<Value = (u32, String)> {
    (0u32..50, "[a-z]{0,4}")
}

#[derive(Debug, Clone, Serialize)]
struct Query {
    table: String,
    limit: u16,
}

fn query_strategy() -> impl Strategy<Value = Query> {
    ("[a-z]{1,8}", any::<u16>()).prop_map(|(table, limit)| Query { table, limit })
}

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (calls.clone(), calls)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Repeated identical calls invoke the function once per distinct key,
    // and every repeat returns the first result unchanged.
    #[test]
    fn prop_function_invoked_once_per_key(calls_in in prop::collection::vec(args_strategy(), 1..40)) {
        let (calls, count) = counter();
        let memo = memoize(move |(n, s): (u32, String)| {
            count.fetch_add(1, Ordering::SeqCst);
            format!("{}-{}", n, s)
        })
        .build();

        for args in &calls_in {
            let first = memo.call(args.clone()).unwrap();
            let second = memo.call(args.clone()).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first, format!("{}-{}", args.0, args.1));
        }

        let distinct: HashSet<_> = calls_in.iter().cloned().collect();
        prop_assert_eq!(calls.load(Ordering::SeqCst), distinct.len());
        prop_assert_eq!(memo.store().len(), distinct.len());
    }

    // Hits and misses together account for every call.
    #[test]
    fn prop_statistics_accuracy(inputs in prop::collection::vec(0u8..20, 1..60)) {
        let memo = memoize(|n: u8| n as u32 * 3).build();

        for n in &inputs {
            memo.call(*n).unwrap();
        }

        let distinct: HashSet<_> = inputs.iter().collect();
        let stats = memo.stats();
        prop_assert_eq!(stats.misses as usize, distinct.len());
        prop_assert_eq!((stats.hits + stats.misses) as usize, inputs.len());
        prop_assert_eq!(stats.total_entries, distinct.len());
    }

    // A constant custom key collapses every call into a single entry.
    #[test]
    fn prop_constant_key_collapses(inputs in prop::collection::vec(any::<i64>(), 1..30)) {
        let (calls, count) = counter();
        let memo = memoize(move |n: i64| {
            count.fetch_add(1, Ordering::SeqCst);
            n
        })
        .cache_key(|_: &i64| "constant")
        .build();

        let first = memo.call(inputs[0]).unwrap();
        for n in &inputs {
            prop_assert_eq!(memo.call(*n).unwrap(), first);
        }

        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
        prop_assert_eq!(memo.store().len(), 1);
    }

    // Distinct values with the same serialized shape share one key.
    #[test]
    fn prop_equal_shapes_share_key(query in query_strategy()) {
        let (calls, count) = counter();
        let memo = memoize(move |q: Query| {
            count.fetch_add(1, Ordering::SeqCst);
            q.limit as usize + q.table.len()
        })
        .build();

        let twin = Query { table: query.table.clone(), limit: query.limit };
        let a = memo.call(query).unwrap();
        let b = memo.call(twin).unwrap();

        prop_assert_eq!(a, b);
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // Failures propagate and are never cached; successes are.
    #[test]
    fn prop_failures_never_cached(inputs in prop::collection::hash_set(0u32..100, 1..20)) {
        let (calls, count) = counter();
        let memo = try_memoize(move |n: u32| {
            count.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                anyhow::bail!("odd input {}", n);
            }
            Ok(n / 2)
        })
        .build();

        for n in &inputs {
            for _ in 0..2 {
                match memo.call(*n) {
                    Ok(half) => prop_assert_eq!(half, n / 2),
                    Err(err) => {
                        prop_assert!(n % 2 == 1);
                        prop_assert!(matches!(err, MemoError::Function(_)));
                    }
                }
            }
        }

        let odd = inputs.iter().filter(|n| *n % 2 == 1).count();
        let even = inputs.len() - odd;
        prop_assert_eq!(calls.load(Ordering::SeqCst), odd * 2 + even);
        prop_assert_eq!(memo.store().len(), even);
    }

    // Overwriting a key always leaves exactly one entry holding the last value.
    #[test]
    fn prop_overwrite_single_entry(values in prop::collection::vec(any::<u32>(), 1..20)) {
        let store: CacheStore<CacheKey, u32> = CacheStore::new();
        let key = CacheKey::String("k".into());

        for v in &values {
            store.insert(key.clone(), *v, None);
        }

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.lookup(&key), values.last().copied());
    }
}

// Separate proptest block with fewer cases for time-sensitive expiry tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After max age has elapsed a repeat call recomputes.
    #[test]
    fn prop_expired_entries_recompute(n in any::<u16>()) {
        let (calls, count) = counter();
        let memo = memoize(move |n: u16| {
            count.fetch_add(1, Ordering::SeqCst);
            n as u32 + 1
        })
        .max_age_ms(50)
        .build();

        prop_assert_eq!(memo.call(n).unwrap(), n as u32 + 1);
        prop_assert_eq!(memo.call(n).unwrap(), n as u32 + 1);
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(80));

        prop_assert_eq!(memo.call(n).unwrap(), n as u32 + 1);
        prop_assert_eq!(calls.load(Ordering::SeqCst), 2);
        prop_assert_eq!(memo.stats().expirations, 1);
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_serialization_failure_touches_nothing() {
        let (calls, count) = counter();
        let memo = memoize(move |m: HashMap<Vec<u8>, u8>| {
            count.fetch_add(1, Ordering::SeqCst);
            m.len()
        })
        .build();

        let mut args = HashMap::new();
        args.insert(vec![1, 2], 3);

        let result = memo.call(args);
        assert!(matches!(result, Err(MemoError::KeySerialization(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(memo.store().is_empty());
        assert_eq!(memo.stats().misses, 0);
    }

    #[test]
    fn test_key_function_failure_touches_nothing() {
        let (calls, count) = counter();
        let memo = memoize(move |n: i32| {
            count.fetch_add(1, Ordering::SeqCst);
            n
        })
        .try_cache_key(|n: &i32| {
            if *n < 0 {
                anyhow::bail!("negative keys are not allowed");
            }
            Ok(*n as u32)
        })
        .build();

        let err = memo.call(-5).unwrap_err();
        assert!(matches!(err, MemoError::KeyFunction(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(memo.stats(), Default::default());
    }
}
