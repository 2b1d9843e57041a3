//! In-memory key/value store with per-entry time-to-live.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// A single cached value with its validity window.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
  value: V,
  /// Monotonic insertion time, used for expiry
  stored_at: Instant,
  /// Wall clock insertion time, for diagnostics only
  stored_wall: DateTime<Utc>,
  ttl: Duration,
}

impl<V> CacheEntry<V> {
  fn age(&self, now: Instant) -> Duration {
    now.saturating_duration_since(self.stored_at)
  }

  /// An entry stays valid up to and including `stored_at + ttl`.
  fn is_expired(&self, now: Instant) -> bool {
    self.age(now) > self.ttl
  }
}

/// Diagnostic view of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStats {
  pub key: String,
  pub age: Duration,
  pub ttl: Duration,
  pub expired: bool,
  pub stored_at: DateTime<Utc>,
}

/// Diagnostic snapshot of the whole cache. Not part of the correctness contract.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
  pub entries: Vec<EntryStats>,
  pub hits: u64,
  pub misses: u64,
}

impl CacheStats {
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entry(&self, key: &str) -> Option<&EntryStats> {
    self.entries.iter().find(|e| e.key == key)
  }
}

/// Thread-safe TTL cache.
///
/// Expired entries are never returned; they are evicted lazily by the `get`
/// that finds them. The application constructs one instance at startup and
/// shares it by `Arc` with every resource that keys into it.
pub struct TtlCache<V> {
  entries: Mutex<HashMap<String, CacheEntry<V>>>,
  hits: AtomicU64,
  misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      hits: AtomicU64::new(0),
      misses: AtomicU64::new(0),
    }
  }

  // Every operation leaves the map consistent, so a poisoned lock is safe to reuse.
  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Look up `key`, returning a clone of the value on a hit.
  pub fn get(&self, key: &str) -> Option<V> {
    let now = Instant::now();
    let mut entries = self.lock();

    let expired = match entries.get(key) {
      None => {
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(key, "cache miss");
        return None;
      }
      Some(entry) => entry.is_expired(now),
    };

    if expired {
      entries.remove(key);
      self.misses.fetch_add(1, Ordering::Relaxed);
      trace!(key, "cache entry expired");
      return None;
    }

    self.hits.fetch_add(1, Ordering::Relaxed);
    trace!(key, "cache hit");
    entries.get(key).map(|entry| entry.value.clone())
  }

  /// Insert or overwrite `key`. Last writer wins.
  pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
    let entry = CacheEntry {
      value,
      stored_at: Instant::now(),
      stored_wall: Utc::now(),
      ttl,
    };
    self.lock().insert(key.into(), entry);
  }

  /// Remove a single entry; no-op if absent.
  pub fn invalidate(&self, key: &str) {
    if self.lock().remove(key).is_some() {
      trace!(key, "cache entry invalidated");
    }
  }

  /// Remove every entry whose key starts with `prefix`.
  pub fn invalidate_prefix(&self, prefix: &str) {
    self.lock().retain(|key, _| !key.starts_with(prefix));
  }

  pub fn clear(&self) {
    self.lock().clear();
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Snapshot entry ages and hit/miss counters. Does not evict.
  pub fn stats(&self) -> CacheStats {
    let now = Instant::now();
    let mut entries: Vec<EntryStats> = self
      .lock()
      .iter()
      .map(|(key, entry)| EntryStats {
        key: key.clone(),
        age: entry.age(now),
        ttl: entry.ttl,
        expired: entry.is_expired(now),
        stored_at: entry.stored_wall,
      })
      .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    CacheStats {
      entries,
      hits: self.hits.load(Ordering::Relaxed),
      misses: self.misses.load(Ordering::Relaxed),
    }
  }
}

impl<V: Clone> Default for TtlCache<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> std::fmt::Debug for TtlCache<V> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TtlCache")
      .field("hits", &self.hits.load(Ordering::Relaxed))
      .field("misses", &self.misses.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}
