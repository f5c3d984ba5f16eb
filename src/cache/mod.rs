// Cache core
//
// Owns entries and mediates between the eviction policy, the expiration
// policy, and the event bus on every operation: expiration is checked
// before eviction runs, and eviction runs before a new entry is inserted.

use crate::error::{Error, Result};
use crate::eviction::EvictionPolicy;
use crate::events::{CacheEvent, CacheListener, ListenerHandle, SyncRegistry};
use crate::expiration::ExpirationPolicy;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// A generic, in-process key-value cache with pluggable eviction and
/// expiration strategies.
///
/// `Cache` is the bare core: it is not thread-safe on its own (every
/// operation, including `get`, mutates eviction/expiration metadata). Wrap
/// it in [`crate::concurrency::ExclusiveWrapper`] or
/// [`crate::concurrency::ShardedWrapper`] to share it across threads.
pub struct Cache<K, V> {
    entries: HashMap<K, V>,
    capacity: usize,
    eviction: Box<dyn EvictionPolicy<K>>,
    expiration: Box<dyn ExpirationPolicy<K>>,
    listeners: SyncRegistry<K, V>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    /// Construct a cache with no expiration (`NoExpiration`).
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize, eviction_policy: Box<dyn EvictionPolicy<K>>) -> Result<Self> {
        Self::with_expiration(
            capacity,
            eviction_policy,
            Box::new(crate::expiration::none::NoExpiration::new()),
        )
    }

    /// Construct a cache with an explicit expiration policy.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `capacity` is zero.
    pub fn with_expiration(
        capacity: usize,
        eviction_policy: Box<dyn EvictionPolicy<K>>,
        expiration_policy: Box<dyn ExpirationPolicy<K>>,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_argument("cache capacity must be at least 1"));
        }
        Ok(Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            eviction: eviction_policy,
            expiration: expiration_policy,
            listeners: SyncRegistry::new(),
        })
    }

    /// Look up `key`. Emits exactly one of `Hit`, `(Expire` then `Miss)`, or
    /// `Miss`.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let Some(value) = self.entries.get(key) else {
            self.listeners.emit(CacheEvent::Miss(key.clone()));
            return None;
        };
        if self.expiration.is_expired(key) {
            self.entries
                .remove(key)
                .expect("expired key observed present just above");
            self.eviction.on_remove(key);
            self.expiration.on_remove(key);
            self.listeners.emit(CacheEvent::Expire(key.clone()));
            self.listeners.emit(CacheEvent::Miss(key.clone()));
            return None;
        }
        let value = value.clone();
        self.eviction.on_access(key);
        self.expiration.on_access(key);
        self.listeners.emit(CacheEvent::Hit(key.clone()));
        Some(value)
    }

    /// Insert or update `key` with no custom TTL (subject to the
    /// expiration policy's own defaults).
    pub fn put(&mut self, key: K, value: V) {
        self.put_with_ttl(key, value, None);
    }

    /// Insert or update `key`, optionally overriding the expiration
    /// policy's TTL for this one key.
    pub fn put_with_ttl(&mut self, key: K, value: V, ttl: Option<Duration>) {
        if self.entries.contains_key(&key) {
            let old = self
                .entries
                .insert(key.clone(), value.clone())
                .expect("update branch observed key present just above");
            self.eviction.on_access(&key);
            self.expiration.on_remove(&key);
            self.expiration.on_insert(key.clone(), ttl);
            self.listeners.emit(CacheEvent::Update(key, old, value));
            return;
        }

        if self.entries.len() >= self.capacity {
            let victim = self
                .eviction
                .select_victim()
                .expect("size == capacity >= 1 guarantees a live victim");
            let victim_value = self
                .entries
                .remove(&victim)
                .expect("eviction policy victim must be a live entry");
            self.eviction.on_remove(&victim);
            self.expiration.on_remove(&victim);
            self.listeners.emit(CacheEvent::Evict(victim, victim_value));
        }

        self.entries.insert(key.clone(), value.clone());
        self.eviction.on_insert(key.clone());
        self.expiration.on_insert(key.clone(), ttl);
        self.listeners.emit(CacheEvent::Insert(key, value));
    }

    /// Remove `key` explicitly. Emits `Remove` iff it returns `true`.
    pub fn remove(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        self.eviction.on_remove(key);
        self.expiration.on_remove(key);
        self.listeners.emit(CacheEvent::Remove(key.clone()));
        true
    }

    /// Drop every entry. Emits exactly one `Clear` carrying the prior size.
    pub fn clear(&mut self) {
        let prior_size = self.entries.len();
        self.entries.clear();
        self.eviction.clear();
        self.expiration.clear();
        self.listeners.emit(CacheEvent::Clear(prior_size));
    }

    /// `true` iff `key` is present and not expired. Constant-time.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key) && !self.expiration.is_expired(key)
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// The cache's immutable capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Atomically swap the eviction policy. The new policy is populated
    /// with an insert notification for every live key, preserving
    /// invariant 1 (exactly one eviction-metadata record per live key).
    /// Prior recency/frequency state is discarded (see DESIGN.md).
    pub fn set_eviction_policy(&mut self, mut policy: Box<dyn EvictionPolicy<K>>) {
        for key in self.entries.keys() {
            policy.on_insert(key.clone());
        }
        self.eviction = policy;
    }

    /// Atomically swap the expiration policy. The new policy is populated
    /// with an insert notification (no custom TTL) for every live key,
    /// preserving invariant 2. Prior deadlines are discarded (see
    /// DESIGN.md).
    pub fn set_expiration_policy(&mut self, mut policy: Box<dyn ExpirationPolicy<K>>) {
        for key in self.entries.keys() {
            policy.on_insert(key.clone(), None);
        }
        self.expiration = policy;
    }

    /// Remaining time-to-live for `key`: `None` if absent or infinite,
    /// `Duration::ZERO` if already past deadline, remaining time otherwise.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.expiration.time_to_live(key)
    }

    /// Sweep every key the expiration policy reports as expired and still
    /// present, removing it. Emits `Expire` (not `Remove`) for each one
    /// removed. Returns the number of entries removed.
    pub fn remove_expired(&mut self) -> usize {
        let candidates = self.expiration.collect_expired();
        let mut removed = 0;
        for key in candidates {
            if self.entries.remove(&key).is_some() {
                self.eviction.on_remove(&key);
                self.expiration.on_remove(&key);
                self.listeners.emit(CacheEvent::Expire(key));
                removed += 1;
            }
        }
        removed
    }

    /// Register a listener. The handle may also be registered with other
    /// caches; unregistration is by identity (see `remove_listener`).
    pub fn add_listener(&mut self, listener: Arc<dyn CacheListener<K, V>>) -> ListenerHandle<K, V> {
        let handle = ListenerHandle::new(listener);
        self.listeners.add(handle.clone());
        handle
    }

    /// Unregister every copy of `handle`. Returns how many were removed.
    pub fn remove_listener(&mut self, handle: &ListenerHandle<K, V>) -> usize {
        self.listeners.remove(handle)
    }
}
