//! Bounded LRU cache keyed by query, with single-flight computation.
//!
//! The map lock is held only to find or insert a per-key cell; the value is
//! computed outside it, so different keys never wait on each other while
//! concurrent callers of the same key share one computation.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use once_cell::sync::OnceCell;
use serde::Serialize;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct QueryCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, Arc<OnceCell<V>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V> std::fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl<K: Hash + Eq, V> QueryCache<K, V> {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // a panic inside the lock cannot leave the LRU half-updated
    fn lock(&self) -> MutexGuard<'_, LruCache<K, Arc<OnceCell<V>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: Hash + Eq + Clone, V: Clone> QueryCache<K, V> {
    /// Cached value for `key`, refreshing its recency.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached value or compute it with `compute`.
    ///
    /// Errors are returned to the caller and not cached; the next call for
    /// the same key computes again.
    pub fn get_or_try_insert_with<E, F>(&self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let cell = {
            let mut entries = self.lock();
            match entries.get(key) {
                Some(cell) => Arc::clone(cell),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    entries.put(key.clone(), Arc::clone(&cell));
                    cell
                }
            }
        };

        let mut computed = false;
        let result = cell.get_or_try_init(|| {
            computed = true;
            compute()
        });

        let counter = if computed { &self.misses } else { &self.hits };
        counter.fetch_add(1, Ordering::Relaxed);

        match result {
            Ok(v) => Ok(v.clone()),
            Err(e) => {
                self.evict_empty(key, &cell);
                Err(e)
            }
        }
    }

    fn evict_empty(&self, key: &K, cell: &Arc<OnceCell<V>>) {
        let mut entries = self.lock();
        let stale = entries
            .peek(key)
            .is_some_and(|c| Arc::ptr_eq(c, cell) && c.get().is_none());
        if stale {
            entries.pop(key);
        }
    }
}
