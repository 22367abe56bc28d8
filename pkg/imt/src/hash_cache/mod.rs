use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use zk_primitives::{hash_merge, Element};

pub use self::metrics::CacheMetrics;

mod metrics;

/// Types which can speed up the node hashes of an [`IndexedTree`] rebuild
///
/// A rebuild after an append recomputes every node on the path from the new leaf to the root, but
/// also every other node of the tree, whose children have not changed. A cache turns those into
/// lookups.
///
/// Implementations must always return the same result as [`hash_merge`]. An incorrect
/// implementation makes the tree produce roots and proofs that nothing else agrees with.
///
/// [`IndexedTree`]: crate::IndexedTree
pub trait HashCache: Sync + 'static {
    /// Calculate [`hash_merge([left, right])`][hash_merge], potentially using data in `self`
    fn hash(&self, left: Element, right: Element) -> Element {
        hash_merge([left, right])
    }
}

/// A ZST that does no caching - the default cache for [`IndexedTree`]
///
/// [`IndexedTree`]: crate::IndexedTree
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHashCache;

impl HashCache for NoopHashCache {}

/// A cache of every node hash it has computed
///
/// It is cheap to clone, and clones share the same storage, so one cache can serve several trees
/// (for example, a tree and a copy restored from its snapshot).
#[derive(Debug, Clone, Default)]
pub struct SimpleHashCache {
    inner: Arc<DashMap<(Element, Element), Element>>,
    metrics: CacheMetrics,
}

impl HashCache for SimpleHashCache {
    #[inline]
    fn hash(&self, left: Element, right: Element) -> Element {
        self.metrics.incr_hashes();

        match self.inner.entry((left, right)) {
            Entry::Occupied(entry) => {
                self.metrics.incr_cache_hits();
                *entry.get()
            }
            Entry::Vacant(entry) => {
                self.metrics.incr_cache_misses();
                *entry.insert(hash_merge([left, right]))
            }
        }
    }
}

impl SimpleHashCache {
    /// Create a new, empty [`SimpleHashCache`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored hashes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether this cache stores no hashes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Hit/miss counters for this cache
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}
