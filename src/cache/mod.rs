//! Best-effort response cache.
//!
//! [`ResponseCache`] wraps an optional [`CacheBackend`] with a get-or-compute
//! operation. The cache never changes the outcome of a call: with a zero TTL
//! or no backend it forwards straight to the supplier, and any backend
//! failure is logged and treated as a miss.
//!
//! # Module layout
//!
//! - [`key`] -- Deterministic, order-independent cache keys.
//! - [`memory`] -- In-process backend.
//! - [`file`] -- On-disk backend shareable across processes.

pub mod file;
pub mod key;
pub mod memory;

pub use file::FileCache;
pub use key::{CacheKey, KeyBuilder, ParamValue};
pub use memory::MemoryCache;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{expand_path, CacheBackendKind, CacheConfig};

/// Failure inside a cache backend. Never escapes [`ResponseCache::get_or_compute`].
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Key/value store with per-entry expiry.
pub trait CacheBackend: Send + Sync {
    /// Return the live value for `key`, or `None` if absent or expired.
    fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    fn put(&self, key: &CacheKey, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Whether a live value exists for `key`.
    fn exists(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Evict every entry.
    fn clear(&self) -> Result<(), CacheError>;
}

/// Get-or-compute facade over an optional backend.
#[derive(Clone)]
pub struct ResponseCache {
    backend: Option<Arc<dyn CacheBackend>>,
    ttl: Duration,
}

impl ResponseCache {
    /// Cache backed by `backend` with a default entry lifetime of `ttl`.
    pub fn new(backend: Arc<dyn CacheBackend>, ttl: Duration) -> Self {
        Self {
            backend: Some(backend),
            ttl,
        }
    }

    /// A cache that always calls the supplier.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            ttl: Duration::ZERO,
        }
    }

    /// Build the cache described by the `[cache]` configuration section.
    pub fn from_config(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendKind::None => return Self::disabled(),
            CacheBackendKind::Memory => Arc::new(MemoryCache::new(config.max_entries)),
            CacheBackendKind::File => Arc::new(FileCache::new(expand_path(&config.directory))),
        };
        Self::new(backend, ttl)
    }

    /// Default entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether lookups with the default TTL can hit the backend.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some() && !self.ttl.is_zero()
    }

    /// Return the cached value for `key`, or compute it with `supplier` and
    /// store it for `ttl`.
    ///
    /// Only the supplier's error is ever returned. A zero `ttl` or a missing
    /// backend bypasses the cache entirely.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        supplier: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let backend = match &self.backend {
            Some(backend) if !ttl.is_zero() => backend,
            _ => return supplier().await,
        };

        match backend.get(key) {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(hit) => {
                    debug!(key = %key, "cache hit");
                    return Ok(hit);
                }
                Err(e) => warn!(key = %key, error = %e, "unreadable cache entry, recomputing"),
            },
            Ok(None) => debug!(key = %key, "cache miss"),
            Err(e) => warn!(key = %key, error = %e, "cache read failed, recomputing"),
        }

        let value = supplier().await?;

        match serde_json::to_value(&value) {
            Ok(json) => {
                if let Err(e) = backend.put(key, json, ttl) {
                    warn!(key = %key, error = %e, "cache write failed");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "value not cacheable"),
        }

        Ok(value)
    }

    /// [`get_or_compute`](Self::get_or_compute) with the default TTL.
    pub async fn fetch<T, E, F, Fut>(&self, key: &CacheKey, supplier: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute(key, self.ttl, supplier).await
    }

    /// Whether a live entry exists. Backend failures read as `false`.
    pub fn exists(&self, key: &CacheKey) -> bool {
        match &self.backend {
            Some(backend) => backend.exists(key).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "cache lookup failed");
                false
            }),
            None => false,
        }
    }

    /// Evict every entry. A no-op without a backend.
    pub fn clear(&self) -> Result<(), CacheError> {
        match &self.backend {
            Some(backend) => backend.clear(),
            None => Ok(()),
        }
    }
}
