//! Recency Tracker Module
//!
//! Least-recently-used ordering for caches configured with an entry bound.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks key recency for the optional size bound.
///
/// Every use stamps the key with a fresh tick. `order` sorts keys by tick, so
/// the least recently used key is its first entry. Touch, forget and pop cost
/// O(log n) while the cache lock is held.
#[derive(Debug, Default)]
pub struct LruTracker {
    ticks: HashMap<String, u64>,
    order: BTreeMap<u64, String>,
    next_tick: u64,
}

impl LruTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks `key` as most recently used, inserting it if unknown.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(current) => {
                if let Some(owned) = self.order.remove(current) {
                    self.order.insert(tick, owned);
                }
                *current = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
                self.order.insert(tick, key.to_string());
            }
        }
    }

    // == Forget ==
    /// Stops tracking `key`. Unknown keys are ignored.
    pub fn forget(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    // == Pop ==
    /// Removes and returns the least recently used key.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Keeps only the keys for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ticks.retain(|key, _| keep(key));
        let ticks = &self.ticks;
        self.order.retain(|_, key| ticks.contains_key(key));
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
