use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// String-keyed integer accumulator with monotonic distinct-key tracking.
///
/// The two per-host tallies (bytes and sessions) are instances of this type.
/// Keys spring into existence on the first signed delta applied to them;
/// `value()` never fabricates a zero entry for a key that was never touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counter {
    entries: HashMap<String, i64>,
    distinct_seen: u64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `key`, creating the entry if absent.
    ///
    /// A key counts toward `distinct_seen` exactly once, on the transition
    /// from absent to present. `delta` may be negative.
    pub fn increment(&mut self, key: &str, delta: i64) {
        use std::collections::hash_map::Entry;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut e) => *e.get_mut() += delta,
            Entry::Vacant(v) => {
                v.insert(delta);
                self.distinct_seen += 1;
            }
        }
    }

    /// Subtract `delta` from `key`, creating the entry (at `-delta`) if absent.
    pub fn decrement(&mut self, key: &str, delta: i64) {
        self.increment(key, -delta);
    }

    /// Current value of `key`, or 0 when the key was never touched.
    pub fn value(&self, key: &str) -> i64 {
        self.entries.get(key).copied().unwrap_or(0)
    }

    /// Number of unique keys ever touched. Equals the entry count at all
    /// times: entries are never removed.
    pub fn distinct_seen(&self) -> u64 {
        self.distinct_seen
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(value, key)` pairs sorted ascending by value, ties broken by
    /// key. A total order is required so that two runs over the same input
    /// produce identical reports. `descending` returns the exact reverse.
    pub fn sorted_snapshot(&self, descending: bool) -> Vec<(i64, String)> {
        let mut pairs: Vec<(i64, String)> = self
            .entries
            .iter()
            .map(|(k, v)| (*v, k.clone()))
            .collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        if descending {
            pairs.reverse();
        }
        pairs
    }
}
