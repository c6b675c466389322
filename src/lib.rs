//! EsportsConnect read-path cache
//!
//! In-memory TTL cache with lazy expiry, an optional LRU bound, a memoizing
//! wrapper for read operations and canonical key builders.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memoize;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, CacheManager};
pub use config::Config;
pub use error::{CacheError, Result};
pub use memoize::{fetch_cached, refetch, Memoized};
pub use tasks::spawn_cleanup_task;
