//! Memoized transitive dependency lookups.
//!
//! Entries are keyed by `(graph.version(), module)`. A rebuilt graph carries
//! a new version, so results computed against an older graph are never
//! returned for a newer one; they simply age out of the LRU.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{CacheOptions, DEFAULT_CACHE_CAPACITY};
use crate::error::{Error, Result};
use crate::graph::Graph;

type CacheKey = (u64, String);

/// Hit and miss counters plus current size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that computed a fresh closure
    pub misses: u64,
    /// Entries currently held
    pub size: usize,
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<CacheKey, Arc<BTreeSet<String>>>,
    hits: u64,
    misses: u64,
}

/// A bounded cache of transitive dependency sets.
///
/// Safe to share between threads; lookups take a short lock.
#[derive(Debug)]
pub struct DependencyCache {
    inner: Mutex<Inner>,
}

impl DependencyCache {
    /// Create a cache holding at most `capacity` closures.
    ///
    /// A capacity of zero falls back to the default.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Create a cache from configuration.
    #[must_use]
    pub fn from_options(options: &CacheOptions) -> Self {
        Self::new(options.capacity)
    }

    /// Every module `key` depends on, directly or indirectly.
    ///
    /// `key` itself is excluded unless it sits on a cycle back to itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleNotFound`] if `key` is not in `graph`.
    pub fn get_transitive_deps(&self, graph: &Graph, key: &str) -> Result<Arc<BTreeSet<String>>> {
        if !graph.contains(key) {
            return Err(Error::ModuleNotFound(key.to_string()));
        }

        let cache_key = (graph.version(), key.to_string());
        {
            let mut inner = self.inner.lock();
            if let Some(found) = inner.entries.get(&cache_key).cloned() {
                inner.hits += 1;
                trace!(module = key, "Transitive dependency cache hit");
                return Ok(found);
            }
        }

        // Computed outside the lock; a racing thread may compute the same
        // closure, which is harmless.
        let closure = Arc::new(transitive_dependencies(graph, key));

        let mut inner = self.inner.lock();
        inner.misses += 1;
        inner.entries.put(cache_key, Arc::clone(&closure));
        trace!(module = key, size = closure.len(), "Transitive dependency cache miss");
        Ok(closure)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear_caches(&self) {
        self.inner.lock().entries.clear();
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            size: inner.entries.len(),
        }
    }
}

impl Default for DependencyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

fn transitive_dependencies(graph: &Graph, key: &str) -> BTreeSet<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut closure = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([key]);

    while let Some(current) = queue.pop_front() {
        for dep in graph.dependencies_of(current) {
            if seen.insert(dep) {
                closure.insert(dep.clone());
                queue.push_back(dep);
            }
        }
    }
    closure
}
