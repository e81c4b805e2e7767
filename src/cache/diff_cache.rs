// src/cache/diff_cache.rs
//! In-memory change detection for template saves.
//!
//! Tracks the last-known content hash per template name so the save API
//! can skip redundant writes. The cache is advisory only: losing it costs
//! at most one extra write, and it must never stand in for on-disk
//! existence checks.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Maximum tracked names before an eviction pass runs.
pub const MAX_ENTRIES: usize = 200;

/// Fraction of the cap kept after an eviction pass.
pub const EVICT_KEEP_RATIO: f64 = 0.8;

/// Outcome of a [`DiffCache::check_and_update`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Content differs from the last recorded hash (or the name is new).
    Changed { hash: String },
    /// Content is byte-identical to the last recorded hash.
    Unchanged,
}

/// Hash the canonical serialization of `content`.
///
/// `serde_json::Value` objects are key-ordered maps, so serialization is
/// already canonical at every nesting level.
pub fn content_hash(content: &Value) -> String {
    hex::encode(Sha256::digest(content.to_string().as_bytes()))
}

/// Bounded `name -> content hash` map with insertion-order eviction.
///
/// Eviction is insertion-order, not access-order: updating an existing
/// name keeps its original position, and lookups never reorder. This
/// matches the original extension's dict semantics and must not be
/// replaced with a true LRU.
#[derive(Debug)]
pub struct DiffCache {
    hashes: HashMap<String, String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for DiffCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hashes: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Compare `content` against the recorded hash for `name`.
    ///
    /// Identical content returns [`DiffOutcome::Unchanged`] without
    /// touching state. Otherwise the new hash is recorded, an eviction
    /// check runs, and the hash is returned in [`DiffOutcome::Changed`].
    pub fn check_and_update(&mut self, name: &str, content: &Value) -> DiffOutcome {
        let hash = content_hash(content);

        if self.hashes.get(name) == Some(&hash) {
            return DiffOutcome::Unchanged;
        }

        if !self.hashes.contains_key(name) {
            self.order.push_back(name.to_string());
        }
        self.hashes.insert(name.to_string(), hash.clone());
        self.evict_oldest();

        DiffOutcome::Changed { hash }
    }

    /// Drop the entry for `name`, if any. Used when a write fails after
    /// the cache already accepted the new hash, so the next attempt is not
    /// skipped.
    pub fn invalidate(&mut self, name: &str) -> bool {
        if self.hashes.remove(name).is_none() {
            return false;
        }
        if let Some(pos) = self.order.iter().position(|n| n == name) {
            self.order.remove(pos);
        }
        true
    }

    /// Remove oldest entries once the count exceeds the cap, keeping
    /// `floor(capacity * EVICT_KEEP_RATIO)`. Runs only as a side effect of
    /// insertion, never of lookup.
    fn evict_oldest(&mut self) {
        if self.hashes.len() <= self.capacity {
            return;
        }
        let keep = (self.capacity as f64 * EVICT_KEEP_RATIO) as usize;
        let evicted = self.hashes.len() - keep;
        while self.hashes.len() > keep {
            if let Some(name) = self.order.pop_front() {
                self.hashes.remove(&name);
            } else {
                break;
            }
        }
        tracing::debug!(evicted, kept = self.hashes.len(), "evicted old template state entries");
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hashes.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_then_unchanged() {
        let mut cache = DiffCache::new();
        let content = json!([{"a": 1}]);

        assert!(matches!(
            cache.check_and_update("Foo", &content),
            DiffOutcome::Changed { .. }
        ));
        assert_eq!(cache.check_and_update("Foo", &content), DiffOutcome::Unchanged);
    }

    #[test]
    fn test_any_byte_change_is_changed_again() {
        let mut cache = DiffCache::new();
        cache.check_and_update("Foo", &json!([{"a": 1}]));
        cache.check_and_update("Foo", &json!([{"a": 1}]));

        assert!(matches!(
            cache.check_and_update("Foo", &json!([{"a": 2}])),
            DiffOutcome::Changed { .. }
        ));
    }

    #[test]
    fn test_hash_is_key_order_insensitive() {
        let a = json!({"x": 1, "y": 2});
        let b: Value = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_eviction_keeps_most_recent_160_of_201() {
        let mut cache = DiffCache::new();
        for i in 0..201 {
            cache.check_and_update(&format!("name-{i}"), &json!(i));
        }

        assert_eq!(cache.len(), 160);
        for i in 0..41 {
            assert!(!cache.contains(&format!("name-{i}")), "name-{i} should be evicted");
        }
        for i in 41..201 {
            assert!(cache.contains(&format!("name-{i}")), "name-{i} should remain");
        }
    }

    #[test]
    fn test_update_does_not_refresh_insertion_position() {
        let mut cache = DiffCache::with_capacity(2);
        cache.check_and_update("old", &json!(1));
        cache.check_and_update("mid", &json!(1));
        // Updating "old" must not move it to the back of the queue.
        cache.check_and_update("old", &json!(2));
        cache.check_and_update("new", &json!(1));

        // cap 2 exceeded at 3 entries: keep floor(2 * 0.8) = 1, the newest.
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("new"));
        assert!(!cache.contains("old"));
    }

    #[test]
    fn test_lookup_never_evicts() {
        let mut cache = DiffCache::with_capacity(3);
        for i in 0..3 {
            cache.check_and_update(&format!("n{i}"), &json!(i));
        }
        for _ in 0..10 {
            cache.check_and_update("n0", &json!(0));
        }
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_invalidate() {
        let mut cache = DiffCache::new();
        cache.check_and_update("Foo", &json!(1));
        assert!(cache.invalidate("Foo"));
        assert!(!cache.invalidate("Foo"));
        assert!(matches!(
            cache.check_and_update("Foo", &json!(1)),
            DiffOutcome::Changed { .. }
        ));
    }
}
