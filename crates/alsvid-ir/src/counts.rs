//! Measurement count distributions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Histogram of measured bitstrings.
///
/// Keys are bitstrings as reported by the backend (most significant
/// classical bit first, registers optionally separated by spaces). Keys are
/// ordered so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create an empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`, saturating at `u64::MAX`.
    pub fn add(&mut self, bitstring: impl Into<String>, count: u64) {
        let slot = self.0.entry(bitstring.into()).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Count recorded for `bitstring`.
    pub fn get(&self, bitstring: &str) -> Option<u64> {
        self.0.get(bitstring).copied()
    }

    /// Total number of shots, or `None` if it does not fit in a `u64`.
    pub fn try_shots(&self) -> Option<u64> {
        self.0.values().try_fold(0u64, |total, &c| total.checked_add(c))
    }

    /// Total number of shots, saturating at `u64::MAX`. For display only.
    pub fn shots(&self) -> u64 {
        self.0.values().fold(0, |total, &c| total.saturating_add(c))
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(bitstring, count)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.0.iter()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

impl From<BTreeMap<String, u64>> for Counts {
    fn from(map: BTreeMap<String, u64>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (k, v) in iter {
            counts.add(k, v);
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Counts {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Counts {
    type Item = (String, u64);
    type IntoIter = btree_map::IntoIter<String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
