//! In-process TTL cache over fetch results.
//!
//! Entries expire after a fixed TTL and a background sweeper evicts stale
//! slots so memory does not grow between reads. Fetch errors are never
//! cached and leave any previously cached entry untouched. Concurrent
//! fetches for the same key may race; last writer wins, which is harmless
//! because every fetch reads the same upstream state.
//!
//! Time comes from `tokio::time` so tests drive expiry with a paused clock.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::time::Instant;

use crate::store::EngineResult;

/// A fetch result together with whether it was served from cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<V> {
    pub data: V,
    pub from_cache: bool,
}

#[derive(Debug)]
struct Slot<V> {
    value: V,
    expires_at: Instant,
}

/// Keyed TTL cache. Values are cloned out, so callers store `Arc`ed
/// payloads when the data is large.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Live (non-expired) value for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .get(key)
            .filter(|slot| slot.expires_at > Instant::now())
            .map(|slot| slot.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(
            key,
            Slot {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Serve `key` from cache, or run `fetch` and cache its success.
    /// `force_refresh` bypasses the lookup but still stores the result.
    ///
    /// The lock is not held across the fetch, so concurrent misses may fetch
    /// redundantly. Errors propagate to the caller uncached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: K,
        force_refresh: bool,
        fetch: F,
    ) -> EngineResult<Cached<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<V>>,
    {
        if !force_refresh {
            if let Some(value) = self.get(&key) {
                return Ok(Cached {
                    data: value,
                    from_cache: true,
                });
            }
        }

        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(Cached {
            data: value,
            from_cache: false,
        })
    }

    /// Drop one entry, or every entry when `key` is `None`.
    pub fn invalidate(&self, key: Option<&K>) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match key {
            Some(key) => {
                slots.remove(key);
            }
            None => slots.clear(),
        }
    }

    /// Evict expired slots. Called periodically by the sweeper.
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.retain(|_, slot| slot.expires_at > now);
    }

    /// Slot count including expired-but-unswept entries.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawn the periodic eviction task for a shared cache.
///
/// The task holds only a weak reference and exits once the cache is dropped,
/// so spawning never leaks the cache.
pub fn spawn_sweeper<K, V>(cache: &Arc<TtlCache<K, V>>, interval: Duration)
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    let weak: Weak<TtlCache<K, V>> = Arc::downgrade(cache);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(cache) = weak.upgrade() else {
                break;
            };
            cache.sweep();
        }
    });
}
