use std::sync::atomic::{AtomicU64, Ordering};

/// Per-namespace counters of deprecation activity.
///
/// Every call that reaches an emitter lands in exactly one bucket:
///
/// - `emitted`: a notice was written (first occurrence, or any occurrence in trace mode)
/// - `repeated`: the message cache recognised the (call site, message) pair
/// - `suppressed`: the namespace or the whole registry is silenced
///
/// # Thread Safety
///
/// Counters are atomics updated with `Relaxed` ordering; they are monitoring
/// data and impose no ordering on anything else.
///
/// # Examples
///
/// ```
/// use depwarn_core::NoticeStats;
///
/// let stats = NoticeStats::new();
/// stats.record_emitted();
/// stats.record_repeated();
/// stats.record_repeated();
/// stats.record_repeated();
///
/// assert_eq!(stats.total(), 4);
/// assert!((stats.repeat_rate() - 0.75).abs() < f64::EPSILON);
/// ```
#[derive(Debug)]
pub struct NoticeStats {
    emitted: AtomicU64,
    repeated: AtomicU64,
    suppressed: AtomicU64,
}

impl NoticeStats {
    pub fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            repeated: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_repeated(&self) {
        self.repeated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn repeated(&self) -> u64 {
        self.repeated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// All calls seen by the namespace, including suppressed ones.
    #[inline]
    pub fn total(&self) -> u64 {
        self.emitted() + self.repeated() + self.suppressed()
    }

    /// Fraction of non-suppressed calls answered by the message cache.
    ///
    /// Returns 0.0 when nothing reached the cache.
    pub fn repeat_rate(&self) -> f64 {
        let checked = self.emitted() + self.repeated();
        if checked == 0 {
            0.0
        } else {
            self.repeated() as f64 / checked as f64
        }
    }

    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.repeated.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
    }
}

impl Default for NoticeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NoticeStats {
    fn clone(&self) -> Self {
        Self {
            emitted: AtomicU64::new(self.emitted()),
            repeated: AtomicU64::new(self.repeated()),
            suppressed: AtomicU64::new(self.suppressed()),
        }
    }
}
