//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// A memoized value plus the metadata needed to decide whether it is live.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The stored value, opaque to the cache
    pub data: T,
    /// Creation time in milliseconds (clock-relative)
    pub timestamp: u64,
    /// Time to live in milliseconds
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    pub fn new(data: T, now: u64, ttl: u64) -> Self {
        Self {
            data,
            timestamp: now,
            ttl,
        }
    }

    // == Liveness ==
    /// Checks whether the entry may still be served at `now`.
    ///
    /// Boundary condition: an entry is live while `now - timestamp <= ttl`, so
    /// it is still served at exactly `timestamp + ttl` and stale one
    /// millisecond later. A clock reading earlier than `timestamp` counts as
    /// zero elapsed time.
    pub fn is_live_at(&self, now: u64) -> bool {
        self.age_at(now) <= self.ttl
    }

    /// Negation of [`is_live_at`](Self::is_live_at).
    pub fn is_stale_at(&self, now: u64) -> bool {
        !self.is_live_at(now)
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once the entry is stale.
    pub fn remaining_ttl_at(&self, now: u64) -> u64 {
        self.ttl.saturating_sub(self.age_at(now))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("value", 1_000, 500);

        assert_eq!(entry.data, "value");
        assert_eq!(entry.timestamp, 1_000);
        assert_eq!(entry.ttl, 500);
        assert!(entry.is_live_at(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new((), 1_000, 500);

        assert!(entry.is_live_at(1_500), "Entry should be live at exactly ttl");
        assert!(entry.is_stale_at(1_501), "Entry should be stale past ttl");
    }

    #[test]
    fn test_zero_ttl_is_live_only_at_creation() {
        let entry = CacheEntry::new((), 10, 0);

        assert!(entry.is_live_at(10));
        assert!(entry.is_stale_at(11));
    }

    #[test]
    fn test_clock_going_backwards_keeps_entry_live() {
        let entry = CacheEntry::new((), 1_000, 100);

        assert!(entry.is_live_at(900));
        assert_eq!(entry.age_at(900), 0);
    }

    #[test]
    fn test_remaining_ttl() {
        let entry = CacheEntry::new((), 1_000, 500);

        assert_eq!(entry.remaining_ttl_at(1_000), 500);
        assert_eq!(entry.remaining_ttl_at(1_200), 300);
        assert_eq!(entry.remaining_ttl_at(1_500), 0);
        assert_eq!(entry.remaining_ttl_at(9_999), 0);
    }
}
