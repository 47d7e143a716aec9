//! Per-name call counters.

use std::collections::BTreeMap;

use parking_lot::{Mutex, const_mutex};

/// Map from function name to number of recorded calls.
///
/// Keys are the name contents, ordered bytewise, so the same name coming
/// from different translation units shares one counter.
pub struct CounterStore {
    counts: Mutex<BTreeMap<String, u64>>,
}

impl CounterStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: const_mutex(BTreeMap::new()),
        }
    }

    /// Count one call to `name`.
    pub fn record(&self, name: &str) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(name) {
            *count = count.saturating_add(1);
        } else {
            counts.insert(name.to_owned(), 1);
        }
    }

    /// Calls recorded for `name`.
    #[must_use]
    pub fn count(&self, name: &str) -> u64 {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }

    /// Copy of the table in key order.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts.lock().clone()
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_and_count() {
        let store = CounterStore::new();
        assert!(store.is_empty());
        store.record("foo");
        store.record("foo");
        store.record("bar");
        store.record("foo");
        assert_eq!(store.count("foo"), 3);
        assert_eq!(store.count("bar"), 1);
        assert_eq!(store.count("baz"), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_snapshot_is_key_ordered() {
        let store = CounterStore::new();
        for name in ["puts", "malloc", "free", "Zeta"] {
            store.record(name);
        }
        let keys: Vec<_> = store.snapshot().into_keys().collect();
        assert_eq!(keys, ["Zeta", "free", "malloc", "puts"]);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let store = Arc::new(CounterStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        store.record("write");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.count("write"), 8000);
    }
}
