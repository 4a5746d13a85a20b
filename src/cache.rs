//! Fill-once resource cache
//!
//! One slot per key, filled by the first caller that misses and read by
//! everyone after. Concurrent first callers share a single fill. A failed
//! fill leaves the slot empty so a later call can try again. Entries never
//! expire.

use crate::error::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

/// Process-wide cache of remote resources keyed by `K`
pub struct ResourceCache<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> ResourceCache<K, V>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the slot for `key`, filling it with `fill` on a miss
    pub async fn get_or_try_fill<F, Fut>(&self, key: K, fill: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = self.slot(&key);
        let value = cell
            .get_or_try_init(|| async move {
                debug!("Cache miss for {:?}, filling", key);
                fill().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(value))
    }

    /// Read the slot for `key` without filling it
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Check if `key` holds a value
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of filled slots
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|cell| cell.initialized()).count()
    }

    /// Check if no slot is filled
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &K) -> Arc<OnceCell<Arc<V>>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

impl<K, V> Debug for ResourceCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ResourceCache")
            .field("slots", &slots.len())
            .finish()
    }
}
