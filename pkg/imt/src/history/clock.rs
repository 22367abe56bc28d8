use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// A source of timestamps for [`HistoricalRoot`]s
///
/// [`HistoricalRoot`]: crate::HistoricalRoot
pub trait Clock {
    /// The current time, in seconds since the unix epoch
    fn now(&self) -> u64;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // times before the epoch are clamped to it
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A clock that only moves when told to
///
/// Clones share the same time, so a test can keep a handle and advance the clock of a tree it
/// has handed off.
///
/// ```rust
/// # use imt::*;
/// let clock = FixedClock::new(100);
/// let handle = clock.clone();
///
/// handle.advance(5);
/// assert_eq!(clock.now(), 105);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Arc<AtomicU64>,
}

impl FixedClock {
    /// A clock stopped at `now`
    #[must_use]
    pub fn new(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    /// Set the current time
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::Relaxed);
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn fixed_clock_set() {
        let clock = FixedClock::default();
        assert_eq!(clock.now(), 0);

        clock.set(42);
        assert_eq!(clock.now(), 42);
    }
}
