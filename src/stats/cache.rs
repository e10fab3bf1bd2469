//! TTL + LRU response cache.
//!
//! One cache instance per TTL class: league scorers live in a short-lived
//! cache (in-season stats churn hourly), team rosters in a long-lived one
//! (rosters barely move between transfer windows). Each instance bounds its
//! size independently and evicts the least-recently-used entry when full.
//!
//! The read-check-insert sequence is serialized per cache, but the lock is
//! *not* held across a downstream fetch; two tasks racing on the same cold
//! key may both fetch and the first writer wins. A rare duplicate request is
//! tolerated, a held-across-network lock is not.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct CacheEntry<T> {
    data: T,
    inserted_at: Instant,
    last_used: Instant,
}

/// Bounded memoization of responses keyed by query parameter.
#[derive(Debug)]
pub struct ResponseCache<T> {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a live entry, refreshing its recency. Expired entries are
    /// removed on the way out; a lookup never returns a value older than
    /// the TTL.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }
        let entry = entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Some(entry.data.clone())
    }

    /// Store a value, evicting least-recently-used entries once over
    /// capacity.
    pub async fn insert(&self, key: &str, value: T) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                inserted_at: now,
                last_used: now,
            },
        );
        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                    debug!(key = %k, "evicted least-recently-used cache entry");
                }
                None => break,
            }
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache its
    /// success. Failures are returned to the caller and never cached.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            debug!(key, "cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
