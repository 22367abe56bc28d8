use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counters for a [`SimpleHashCache`], shared between its clones
///
/// [`SimpleHashCache`]: crate::SimpleHashCache
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hashes: Arc<AtomicUsize>,
    cache_hits: Arc<AtomicUsize>,
    cache_misses: Arc<AtomicUsize>,
}

impl CacheMetrics {
    /// The number of lookups
    #[inline]
    #[must_use]
    pub fn hashes(&self) -> usize {
        self.hashes.load(Ordering::Relaxed)
    }

    /// The number of lookups answered from the cache
    #[inline]
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// The number of lookups that had to compute a hash
    #[inline]
    #[must_use]
    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// The fraction of lookups answered from the cache, or `None` before the first lookup
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> Option<f64> {
        match self.hashes() {
            0 => None,
            hashes => Some(self.cache_hits() as f64 / hashes as f64),
        }
    }

    /// Set every counter back to zero
    pub fn reset(&self) {
        self.hashes.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }

    pub(crate) fn incr_hashes(&self) {
        self.hashes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }
}
