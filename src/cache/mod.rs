//! Cache Module
//!
//! In-memory caching with per-entry TTL, lazy expiry and an optional LRU bound.

mod clock;
mod entry;
pub mod keys;
mod lru;
mod manager;
mod stats;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use keys::SearchFilters;
pub use lru::LruTracker;
pub use manager::{validate_key, CacheConfig, CacheManager, EntryInfo};
pub use stats::CacheStats;

// == TTL Presets (milliseconds) ==
pub const TTL_SHORT_MS: u64 = 60 * 1000;
pub const TTL_MEDIUM_MS: u64 = 5 * 60 * 1000;
pub const TTL_LONG_MS: u64 = 15 * 60 * 1000;
pub const TTL_VERY_LONG_MS: u64 = 60 * 60 * 1000;

/// TTL applied when a caller does not pass one.
pub const DEFAULT_TTL_MS: u64 = TTL_MEDIUM_MS;
