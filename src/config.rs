//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, DEFAULT_TTL_MS};

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 60_000;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL in milliseconds for entries stored without one
    pub default_ttl_ms: u64,
    /// Entry bound; `None` leaves the cache unbounded
    pub max_entries: Option<usize>,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in milliseconds; 0 disables the task
    pub cleanup_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_ENTRIES` - Entry bound, 0 or unset for unbounded (default: unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL_MS` - Sweep interval, 0 disables it (default: 60000)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", DEFAULT_TTL_MS),
            max_entries: env_parse::<usize>("CACHE_MAX_ENTRIES").filter(|max| *max > 0),
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            cleanup_interval_ms: env_or("CLEANUP_INTERVAL_MS", DEFAULT_CLEANUP_INTERVAL_MS),
        }
    }

    /// Cache construction parameters derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl_ms: self.default_ttl_ms,
            max_entries: self.max_entries,
        }
    }

    /// Sweep interval, or `None` when the background sweep is disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_ms > 0).then(|| Duration::from_millis(self.cleanup_interval_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            max_entries: None,
            server_port: DEFAULT_SERVER_PORT,
            cleanup_interval_ms: DEFAULT_CLEANUP_INTERVAL_MS,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env_parse(name).unwrap_or(default)
}
