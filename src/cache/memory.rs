//! In-process cache backend.
//!
//! Entries live in a [`DashMap`] with an absolute expiry. When the map is
//! full the oldest insertion is evicted, found through an insertion-order
//! queue kept beside the map.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::{CacheBackend, CacheError, CacheKey};

struct CacheEntry {
    value: Value,
    /// Insertion sequence number; matches the newest queue slot for this key.
    seq: u64,
    /// `None` when the ttl runs past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Thread-safe, bounded, TTL-aware memory cache.
pub struct MemoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
    order: Mutex<VecDeque<(CacheKey, u64)>>,
    next_seq: AtomicU64,
    max_entries: usize,
}

impl MemoryCache {
    /// Create a new memory cache holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            next_seq: AtomicU64::new(0),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Pop queue slots until one still names a current entry, and remove it.
    ///
    /// Slots left behind by overwrites or removals are skipped, so the
    /// amortized cost per insert is constant.
    fn evict_oldest(&self) {
        let mut order = self.order.lock();
        while let Some((key, seq)) = order.pop_front() {
            if self
                .entries
                .remove_if(&key, |_, entry| entry.seq == seq)
                .is_some()
            {
                return;
            }
        }
    }

    fn record_insert(&self, key: &CacheKey, seq: u64) {
        let mut order = self.order.lock();
        order.push_back((key.clone(), seq));
        if order.len() > self.max_entries.saturating_mul(2) {
            order.retain(|(key, seq)| {
                self.entries
                    .get(key)
                    .is_some_and(|entry| entry.seq == *seq)
            });
        }
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(Instant::now()) {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    fn put(&self, key: &CacheKey, value: Value, ttl: Duration) -> Result<(), CacheError> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.cleanup_expired();
            if self.entries.len() >= self.max_entries {
                self.evict_oldest();
            }
        }

        let now = Instant::now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                seq,
                expires_at: now.checked_add(ttl),
            },
        );
        self.record_insert(key, seq);
        Ok(())
    }

    fn exists(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        self.order.lock().clear();
        Ok(())
    }
}
