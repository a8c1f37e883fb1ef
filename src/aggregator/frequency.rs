//! Frequency counting with deterministic top-K selection.
//!
//! Keys remember the order they were first seen in, so entries with equal
//! counts always come out in encounter order.

use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts keyed by `K`
#[derive(Debug, Clone)]
pub struct Histogram<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u64)>,
    total: u64,
}

impl<K> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
            total: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> Histogram<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`
    pub fn add(&mut self, key: K) {
        self.total += 1;
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn count(&self, key: &K) -> u64 {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Occurrences across all keys
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }

    /// The `k` most frequent keys, descending by count
    ///
    /// Returns at most `min(k, self.len())` entries. The sort is stable, so
    /// ties keep first-seen order.
    pub fn top_k(&self, k: usize) -> Vec<(&K, u64)> {
        let mut ranked: Vec<(&K, u64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(keys: &[&'static str]) -> Histogram<&'static str> {
        let mut h = Histogram::new();
        for key in keys {
            h.add(*key);
        }
        h
    }

    #[test]
    fn test_counts_and_total() {
        let h = histogram(&["a", "b", "a", "c", "a"]);
        assert_eq!(h.count(&"a"), 3);
        assert_eq!(h.count(&"b"), 1);
        assert_eq!(h.count(&"z"), 0);
        assert_eq!(h.total(), 5);
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn test_top_k_descending_with_stable_ties() {
        let h = histogram(&["x", "y", "z", "y", "z", "w"]);
        let top = h.top_k(10);
        assert_eq!(top, vec![(&"y", 2), (&"z", 2), (&"x", 1), (&"w", 1)]);
    }

    #[test]
    fn test_top_k_never_exceeds_k_or_distinct() {
        let h = histogram(&["a", "b", "b", "c"]);
        assert_eq!(h.top_k(2).len(), 2);
        assert_eq!(h.top_k(0).len(), 0);
        assert_eq!(h.top_k(50).len(), 3);
        assert!(Histogram::<String>::new().top_k(5).is_empty());
    }

    #[test]
    fn test_percentage_of_zero_whole() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
