//! Memoization Module
//!
//! Wraps read operations (profile fetch, post pages, search) so that repeated
//! calls with the same arguments are answered from a shared [`CacheManager`].
//!
//! A failed or cancelled operation never populates the cache, and its error
//! reaches the caller unchanged.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::cache::{keys, validate_key, CacheManager, Clock, SystemClock};
use crate::error::{CacheError, Result};

// == Key Strategy ==
/// Maps the arguments of a wrapped operation to a cache key.
pub trait KeyFn<A> {
    fn key_for(&self, args: &A) -> Result<String>;
}

/// Caller-supplied key function.
impl<A, G> KeyFn<A> for G
where
    G: Fn(&A) -> String,
{
    fn key_for(&self, args: &A) -> Result<String> {
        Ok(self(args))
    }
}

/// Default key strategy: canonical JSON of the arguments, optionally behind a
/// namespace prefix.
///
/// Two wrappers sharing one cache should use different namespaces, otherwise
/// equal arguments land on the same slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgsKey {
    namespace: Option<String>,
}

impl ArgsKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaced(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }
}

impl<A: Serialize> KeyFn<A> for ArgsKey {
    fn key_for(&self, args: &A) -> Result<String> {
        let body = keys::args_key(args)?;
        Ok(match &self.namespace {
            Some(namespace) => format!("{}:{}", namespace, body),
            None => body,
        })
    }
}

// == Memoized ==
/// A read operation bound to a cache.
///
/// Use [`call`](Self::call) for operations returning `Result<T, E>` directly
/// and [`call_async`](Self::call_async) for operations returning a future.
/// `E` must accept [`CacheError`] so a bad key is reported through the
/// caller's own error type.
pub struct Memoized<T, F, K = ArgsKey, C = SystemClock> {
    cache: Arc<CacheManager<T, C>>,
    operation: F,
    key_fn: K,
    ttl: Option<u64>,
}

impl<T, F, C: Clock> Memoized<T, F, ArgsKey, C> {
    /// Wraps `operation`, keying on the canonical JSON of its arguments.
    pub fn new(cache: Arc<CacheManager<T, C>>, operation: F) -> Self {
        Self::with_strategy(cache, operation, ArgsKey::new())
    }

    /// Like [`new`](Self::new) with keys prefixed by `namespace:`.
    pub fn namespaced(
        cache: Arc<CacheManager<T, C>>,
        namespace: impl Into<String>,
        operation: F,
    ) -> Self {
        Self::with_strategy(cache, operation, ArgsKey::namespaced(namespace))
    }
}

impl<T, F, K, C: Clock> Memoized<T, F, K, C> {
    /// Wraps `operation` with an explicit key function.
    pub fn with_key<A>(cache: Arc<CacheManager<T, C>>, operation: F, key_fn: K) -> Self
    where
        K: Fn(&A) -> String,
    {
        Self::with_strategy(cache, operation, key_fn)
    }

    fn with_strategy(cache: Arc<CacheManager<T, C>>, operation: F, key_fn: K) -> Self {
        Self {
            cache,
            operation,
            key_fn,
            ttl: None,
        }
    }

    /// TTL in milliseconds for values stored by this wrapper.
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }

    pub fn ttl(&self) -> Option<u64> {
        self.ttl
    }

    pub fn cache(&self) -> &Arc<CacheManager<T, C>> {
        &self.cache
    }

    /// The cache key a call with `args` would use.
    pub fn key_for<A>(&self, args: &A) -> Result<String>
    where
        K: KeyFn<A>,
    {
        let key = self.key_fn.key_for(args)?;
        validate_key(&key)?;
        Ok(key)
    }

    /// Drops the memoized value for `args`, e.g. after a write to that entity.
    pub fn invalidate<A>(&self, args: &A) -> Result<bool>
    where
        K: KeyFn<A>,
    {
        let key = self.key_for(args)?;
        Ok(self.cache.delete(&key))
    }
}

impl<T: Clone, F, K, C: Clock> Memoized<T, F, K, C> {
    // == Synchronous Call ==
    pub fn call<A, E>(&self, args: A) -> std::result::Result<T, E>
    where
        F: Fn(A) -> std::result::Result<T, E>,
        K: KeyFn<A>,
        E: From<CacheError>,
    {
        let key = self.key_for(&args)?;
        if let Some(hit) = self.cache.get(&key) {
            trace!(key = %key, "memoized hit");
            return Ok(hit);
        }

        let value = (self.operation)(args)?;
        self.cache.set(key, value.clone(), self.ttl)?;
        Ok(value)
    }

    // == Asynchronous Call ==
    /// Hits resolve without suspending; misses await the operation and store
    /// its value. Dropping the returned future before it completes leaves the
    /// cache untouched.
    pub async fn call_async<A, E, Fut>(&self, args: A) -> std::result::Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        K: KeyFn<A>,
        E: From<CacheError>,
    {
        let key = self.key_for(&args)?;
        if let Some(hit) = self.cache.get(&key) {
            trace!(key = %key, "memoized hit");
            return Ok(hit);
        }

        let value = (self.operation)(args).await?;
        self.cache.set(key, value.clone(), self.ttl)?;
        Ok(value)
    }
}

// == Keyed Fetch ==
/// Returns the live value under `key`, or runs `fetcher` and stores its result.
pub async fn fetch_cached<T, C, E, Fut>(
    cache: &CacheManager<T, C>,
    key: &str,
    ttl: Option<u64>,
    fetcher: impl FnOnce() -> Fut,
) -> std::result::Result<T, E>
where
    T: Clone,
    C: Clock,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<CacheError>,
{
    validate_key(key)?;
    if let Some(hit) = cache.get(key) {
        return Ok(hit);
    }

    let value = fetcher().await?;
    cache.set(key, value.clone(), ttl)?;
    Ok(value)
}

/// Drops `key` and fetches it again. The entry stays gone if the fetch fails.
pub async fn refetch<T, C, E, Fut>(
    cache: &CacheManager<T, C>,
    key: &str,
    ttl: Option<u64>,
    fetcher: impl FnOnce() -> Fut,
) -> std::result::Result<T, E>
where
    T: Clone,
    C: Clock,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<CacheError>,
{
    cache.delete(key);
    fetch_cached(cache, key, ttl, fetcher).await
}
