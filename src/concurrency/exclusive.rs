// Exclusive-lock wrapper
//
// Serialises every operation through a single readers-writer lock, taken
// exclusively even for `get`: the core mutates eviction/expiration metadata
// on a read (LRU reordering, TTL lazy deletion), so a shared lock on `get`
// would be unsound, not merely conservative: both eviction and expiration
// bookkeeping mutate on read.
// Observers that provably never mutate (`size`, `capacity`, `contains`)
// take the lock in shared mode.

use crate::cache::Cache;
use crate::eviction::EvictionPolicy;
use crate::events::{CacheListener, ListenerHandle};
use crate::expiration::ExpirationPolicy;
use parking_lot::RwLock;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// A single-lock, thread-safe wrapper around [`Cache`].
pub struct ExclusiveWrapper<K, V> {
    inner: RwLock<Cache<K, V>>,
}

impl<K, V> ExclusiveWrapper<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    pub fn new(inner: Cache<K, V>) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.write().get(key)
    }

    pub fn put(&self, key: K, value: V) {
        self.inner.write().put(key, value);
    }

    pub fn put_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        self.inner.write().put_with_ttl(key, value, ttl);
    }

    pub fn remove(&self, key: &K) -> bool {
        self.inner.write().remove(key)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Does not mutate cache state, so a shared lock suffices.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// Does not mutate cache state, so a shared lock suffices.
    pub fn size(&self) -> usize {
        self.inner.read().size()
    }

    /// Does not mutate cache state, so a shared lock suffices.
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        self.inner.read().time_to_live(key)
    }

    pub fn remove_expired(&self) -> usize {
        self.inner.write().remove_expired()
    }

    pub fn set_eviction_policy(&self, policy: Box<dyn EvictionPolicy<K>>) {
        self.inner.write().set_eviction_policy(policy);
    }

    pub fn set_expiration_policy(&self, policy: Box<dyn ExpirationPolicy<K>>) {
        self.inner.write().set_expiration_policy(policy);
    }

    pub fn add_listener(&self, listener: Arc<dyn CacheListener<K, V>>) -> ListenerHandle<K, V> {
        self.inner.write().add_listener(listener)
    }

    pub fn remove_listener(&self, handle: &ListenerHandle<K, V>) -> usize {
        self.inner.write().remove_listener(handle)
    }

    /// Run `f` under the exclusive lock with a mutable reference to the
    /// inner cache, for atomic compound operations the per-call API can't
    /// express (e.g. "insert only if absent").
    pub fn with_exclusive<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cache<K, V>) -> R,
    {
        f(&mut self.inner.write())
    }
}
