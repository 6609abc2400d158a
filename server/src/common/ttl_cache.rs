use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CachedEntry<V> {
    fn new(value: V, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| Instant::now() >= expires_at)
            .unwrap_or(false)
    }
}

/// Shared key/value map with optional per-entry expiry.
///
/// Clones share the same underlying map, so one instance can be handed to
/// every request handler. Expiry is measured from the last write; reads never
/// extend an entry's lifetime.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CachedEntry<V>>>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V, ttl: Option<Duration>) {
        let mut entries = self.entries.write().await;
        entries.insert(key, CachedEntry::new(value, ttl));
    }

    /// Read-modify-write under a single write lock.
    ///
    /// `update` receives the live (non-expired) value, if any. Returning `None`
    /// removes the entry; returning `Some` stores it with a fresh TTL.
    /// Expired entries for other keys are dropped while the lock is held.
    pub async fn update<F>(&self, key: K, ttl: Option<Duration>, update: F) -> Option<V>
    where
        F: FnOnce(Option<V>) -> Option<V>,
    {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());
        let current = entries.remove(&key).map(|entry| entry.value);

        let next = update(current);
        if let Some(value) = &next {
            entries.insert(key, CachedEntry::new(value.clone(), ttl));
        }
        next
    }

    pub async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    pub async fn contains_key(&self, key: &K) -> bool {
        self.get(key).await.is_some()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|entry| !entry.is_expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Entries held in the map, expired or not.
    #[cfg(test)]
    pub(crate) async fn stored_len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
