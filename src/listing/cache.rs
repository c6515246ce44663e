//! In-memory TTL cache of fetched pages, keyed by canonical query.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::page::Page;

/// A cached page and the instant it stops being fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry<R> {
  pub data: Page<R>,
  pub expires_at: Instant,
}

/// Per-listing page cache. Entries are only evicted when observed expired
/// or cleared explicitly.
#[derive(Debug)]
pub struct ListingCache<R> {
  entries: HashMap<String, CacheEntry<R>>,
  ttl: Duration,
}

impl<R: Clone> ListingCache<R> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      entries: HashMap::new(),
      ttl,
    }
  }

  /// Fresh page for `key`. An expired entry is evicted and reported as a miss.
  pub fn lookup(&mut self, key: &str) -> Option<&Page<R>> {
    let fresh = self.entries.get(key)?.expires_at > Instant::now();
    if !fresh {
      debug!(key, "evicting expired listing entry");
      self.entries.remove(key);
      return None;
    }
    self.entries.get(key).map(|entry| &entry.data)
  }

  /// Store a freshly fetched page, replacing whatever was there.
  pub fn store(&mut self, key: String, data: Page<R>) {
    let expires_at = Instant::now() + self.ttl;
    self.entries.insert(key, CacheEntry { data, expires_at });
  }

  /// Replace the page of an existing entry, keeping its expiry.
  /// Returns false when there is no entry to update.
  pub fn write_through(&mut self, key: &str, data: &Page<R>) -> bool {
    match self.entries.get_mut(key) {
      Some(entry) => {
        entry.data = data.clone();
        true
      }
      None => false,
    }
  }

  pub fn remove(&mut self, key: &str) -> bool {
    self.entries.remove(key).is_some()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.entries.len()
  }
}
