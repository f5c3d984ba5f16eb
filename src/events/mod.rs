// Event bus
//
// Fans out cache lifecycle events to zero or more listeners. The cache core
// (crate::cache) holds a `SyncRegistry` and calls it synchronously, in the
// order fixed by the core's own operation contracts. `dispatcher` provides
// an asynchronous, per-listener fan-out that itself implements
// `CacheListener` so it can be registered like any other listener.

pub mod dispatcher;
pub mod logging;
pub mod stats;

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use uuid::Uuid;

/// A cache lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent<K, V> {
    /// Successful, non-expired `get`.
    Hit(K),
    /// `get` of an absent or expired key.
    Miss(K),
    /// `put` of a new key.
    Insert(K, V),
    /// `put` of an existing key: (key, old value, new value).
    Update(K, V, V),
    /// Capacity-triggered removal: (key, value).
    Evict(K, V),
    /// Removal caused by TTL.
    Expire(K),
    /// Explicit removal.
    Remove(K),
    /// `clear`, carrying the prior size.
    Clear(usize),
}

/// An observer of cache lifecycle events.
///
/// Implementations must tolerate being called from any thread: the sync
/// registry calls from whichever thread drives the triggering operation,
/// and `dispatcher::AsyncDispatcher` calls from a dedicated worker thread.
pub trait CacheListener<K, V>: Send + Sync {
    fn on_event(&self, event: &CacheEvent<K, V>);
}

/// A registered, identity-bearing reference to a listener.
///
/// Listeners are shared (the same handle may be registered with several
/// caches); `remove_listener` compares handles by identity, not by the
/// listener's own equality (there usually isn't one).
pub struct ListenerHandle<K, V> {
    id: Uuid,
    listener: Arc<dyn CacheListener<K, V>>,
}

impl<K, V> ListenerHandle<K, V> {
    pub fn new(listener: Arc<dyn CacheListener<K, V>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            listener,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn listener_arc(&self) -> Arc<dyn CacheListener<K, V>> {
        Arc::clone(&self.listener)
    }
}

impl<K, V> Clone for ListenerHandle<K, V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<K, V> PartialEq for ListenerHandle<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K, V> Eq for ListenerHandle<K, V> {}

impl<K, V> fmt::Debug for ListenerHandle<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle").field("id", &self.id).finish()
    }
}

/// The cache core's list of synchronous listeners.
///
/// Every `ListenerHandle` is valid by construction (Rust has no null
/// references), so there's no "ignore a null handle" case to guard against.
#[derive(Default)]
pub struct SyncRegistry<K, V> {
    listeners: Vec<ListenerHandle<K, V>>,
}

impl<K, V> SyncRegistry<K, V> {
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    pub fn add(&mut self, handle: ListenerHandle<K, V>) {
        self.listeners.push(handle);
    }

    /// Remove every handle sharing `handle`'s identity. Returns how many
    /// were removed.
    pub fn remove(&mut self, handle: &ListenerHandle<K, V>) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|h| h.id() != handle.id());
        before - self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Fan `event` out to every registered listener, synchronously.
    ///
    /// A panicking listener is contained: the panic is caught, logged, and
    /// the remaining listeners still receive the event.
    pub fn emit(&self, event: CacheEvent<K, V>) {
        if self.listeners.is_empty() {
            return;
        }
        for handle in &self.listeners {
            let listener = &handle.listener;
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            if outcome.is_err() {
                tracing::warn!("cache listener panicked while handling an event; continuing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl CacheListener<&'static str, i32> for Counter {
        fn on_event(&self, _event: &CacheEvent<&'static str, i32>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicky;

    impl CacheListener<&'static str, i32> for Panicky {
        fn on_event(&self, _event: &CacheEvent<&'static str, i32>) {
            panic!("boom");
        }
    }

    #[test]
    fn emits_to_every_listener() {
        let mut registry = SyncRegistry::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        registry.add(ListenerHandle::new(counter.clone()));
        registry.add(ListenerHandle::new(counter.clone()));
        registry.emit(CacheEvent::Hit("a"));
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn remove_by_identity_removes_all_copies() {
        let mut registry = SyncRegistry::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let handle = ListenerHandle::new(counter.clone());
        registry.add(handle.clone());
        registry.add(handle.clone());
        let removed = registry.remove(&handle);
        assert_eq!(removed, 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn a_panicking_listener_does_not_stop_delivery_to_others() {
        let mut registry = SyncRegistry::new();
        registry.add(ListenerHandle::new(Arc::new(Panicky)));
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        registry.add(ListenerHandle::new(counter.clone()));
        registry.emit(CacheEvent::Miss("a"));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
