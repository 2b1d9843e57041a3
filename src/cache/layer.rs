//! Cache layer that orchestrates caching logic with network fetching.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::CacheResult;
use super::ttl::{CacheStats, TtlCache};

/// Cache layer that manages caching logic and network fetching.
///
/// Values are stored as JSON so a single cache can hold every entity type.
/// Clones share the same underlying cache.
#[derive(Clone)]
pub struct CacheLayer {
  cache: Arc<TtlCache<Value>>,
}

impl CacheLayer {
  /// Create a new cache layer with its own empty cache.
  pub fn new() -> Self {
    Self::with_cache(Arc::new(TtlCache::new()))
  }

  /// Create a cache layer over an existing shared cache.
  pub fn with_cache(cache: Arc<TtlCache<Value>>) -> Self {
    Self { cache }
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately without calling `fetcher`
  /// 2. If missing or expired, fetch from network
  /// 3. Store the fresh value with `ttl`
  ///
  /// Errors from the fetcher are returned unchanged and nothing is cached.
  pub async fn fetch<T, E, F, Fut>(
    &self,
    key: &str,
    ttl: Duration,
    fetcher: F,
  ) -> Result<CacheResult<T>, E>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if let Some(cached) = self.get::<T>(key) {
      debug!(key, "serving from cache");
      return Ok(CacheResult::from_cache(cached));
    }

    let data = fetcher().await?;
    self.put(key, &data, ttl);
    Ok(CacheResult::from_network(data))
  }

  /// Typed lookup. A value that no longer decodes is dropped and counts as a miss.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let value = self.cache.get(key)?;
    match serde_json::from_value(value) {
      Ok(data) => Some(data),
      Err(e) => {
        warn!(key, error = %e, "dropping undecodable cache entry");
        self.cache.invalidate(key);
        None
      }
    }
  }

  /// Typed insert. Values that fail to serialize are not cached.
  pub fn put<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
    match serde_json::to_value(data) {
      Ok(value) => self.cache.set(key, value, ttl),
      Err(e) => warn!(key, error = %e, "failed to serialize value for cache"),
    }
  }

  pub fn invalidate(&self, key: &str) {
    self.cache.invalidate(key);
  }

  pub fn invalidate_prefix(&self, prefix: &str) {
    self.cache.invalidate_prefix(prefix);
  }

  pub fn clear(&self) {
    self.cache.clear();
  }

  pub fn stats(&self) -> CacheStats {
    self.cache.stats()
  }
}

impl Default for CacheLayer {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[tokio::test]
  async fn test_fetch_miss_then_hit() {
    let layer = CacheLayer::new();
    let calls = AtomicU32::new(0);

    for expected in [CacheSource::Network, CacheSource::Cache] {
      let result = layer
        .fetch("company_list", Duration::from_secs(60), || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok::<_, String>(vec!["acme".to_string()])
        })
        .await
        .unwrap();
      assert_eq!(result.source, expected);
      assert_eq!(result.data, vec!["acme".to_string()]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fetch_error_is_not_cached() {
    let layer = CacheLayer::new();

    let result: Result<CacheResult<u32>, String> = layer
      .fetch("k", Duration::from_secs(60), || async {
        Err("boom".to_string())
      })
      .await;
    assert_eq!(result.unwrap_err(), "boom");
    assert!(layer.stats().is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_fetch_refreshes_after_ttl() {
    let layer = CacheLayer::new();
    layer.put("k", &1u32, Duration::from_millis(100));

    tokio::time::advance(Duration::from_millis(150)).await;

    let result = layer
      .fetch("k", Duration::from_millis(100), || async { Ok::<_, String>(2u32) })
      .await
      .unwrap();
    assert_eq!(result.data, 2);
    assert!(!result.is_cached());
  }

  #[test]
  fn test_undecodable_entry_is_dropped() {
    let layer = CacheLayer::new();
    layer.put("k", &"not a number", Duration::from_secs(60));

    assert_eq!(layer.get::<u32>("k"), None);
    assert!(layer.stats().is_empty());
  }
}
