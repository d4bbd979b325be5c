//! In-process fallback counters.
//!
//! Used when the distributed backend is unavailable. Each key holds a
//! fixed-window count with a reset deadline; the whole read-modify-write
//! runs under one mutex so concurrent requests cannot both observe
//! `count < max` and both increment past the limit.
//!
//! These counters are per-process only. Multiple server instances each
//! enforce their own budget, so the effective global limit is
//! `max_requests * instances`. That is a known property of the fallback,
//! not something to paper over here.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A single counter record: requests seen in the current window.
#[derive(Debug, Clone, Copy)]
struct CounterRecord {
    count: u32,
    reset_at: Instant,
}

/// Process-local fixed-window counters, keyed by `prefix:identifier`.
#[derive(Debug, Default)]
pub struct MemoryCounters {
    records: Mutex<HashMap<String, CounterRecord>>,
}

impl MemoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request against `key` and return whether it is allowed.
    ///
    /// A record whose deadline has passed is replaced, never incremented:
    /// expiry is always checked before the count is touched.
    pub fn check(&self, key: &str, max_requests: u32, window: Duration) -> bool {
        let now = Instant::now();
        let mut records = self.lock();

        match records.get_mut(key) {
            Some(record) if now < record.reset_at => {
                if record.count >= max_requests {
                    return false;
                }
                record.count += 1;
                true
            }
            _ => {
                records.insert(
                    key.to_string(),
                    CounterRecord {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                true
            }
        }
    }

    /// Drop every record whose window has already ended.
    ///
    /// Returns the number of evicted records. Expired records are also
    /// replaced lazily on access; the sweep exists to bound memory for keys
    /// that never come back.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.lock();

        let before = records.len();
        records.retain(|_, record| now < record.reset_at);
        before - records.len()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove all records. Primarily useful in tests.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CounterRecord>> {
        // A poisoned mutex means another thread panicked mid-update; the
        // map is still structurally valid, so keep serving.
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::thread;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_allows_up_to_limit() {
        let counters = MemoryCounters::new();

        for _ in 0..5 {
            assert!(counters.check("submit:1.2.3.4", 5, WINDOW));
        }
        assert!(!counters.check("submit:1.2.3.4", 5, WINDOW));
    }

    #[test]
    fn test_keys_are_independent() {
        let counters = MemoryCounters::new();

        assert!(counters.check("submit:1.2.3.4", 1, WINDOW));
        assert!(!counters.check("submit:1.2.3.4", 1, WINDOW));
        assert!(counters.check("submit:5.6.7.8", 1, WINDOW));
    }

    #[test]
    fn test_window_reset_allows_again() {
        let counters = MemoryCounters::new();
        let short = Duration::from_millis(30);

        assert!(counters.check("k", 1, short));
        assert!(!counters.check("k", 1, short));

        thread::sleep(Duration::from_millis(50));
        assert!(counters.check("k", 1, short));
    }

    #[test]
    fn test_sweep_evicts_only_expired() {
        let counters = MemoryCounters::new();

        counters.check("short", 1, Duration::from_millis(10));
        counters.check("long", 1, WINDOW);
        assert_eq!(counters.len(), 2);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(counters.sweep_expired(), 1);
        assert_eq!(counters.len(), 1);
    }

    #[test]
    fn test_concurrent_checks_never_exceed_limit() {
        use std::sync::Arc;

        let counters = Arc::new(MemoryCounters::new());
        let max = 50u32;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counters = Arc::clone(&counters);
                thread::spawn(move || {
                    let mut allowed = 0u32;
                    for _ in 0..20 {
                        if counters.check("contended", max, WINDOW) {
                            allowed += 1;
                        }
                    }
                    allowed
                })
            })
            .collect();

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_clear() {
        let counters = MemoryCounters::new();
        counters.check("k", 5, WINDOW);
        assert!(!counters.is_empty());

        counters.clear();
        assert!(counters.is_empty());
    }
}
