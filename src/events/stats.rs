// Stats collaborator
//
// A `CacheListener` backed entirely by atomics, so it is safe under
// concurrent delivery (the sharded wrapper, or the async dispatcher's
// worker threads, may call `on_event` from several threads at once).

use super::{CacheEvent, CacheListener};
use std::sync::atomic::{AtomicU64, Ordering};

/// A point-in-time snapshot of a `StatsListener`'s counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub removals: u64,
    pub clears: u64,
}

impl StatsSnapshot {
    /// Cache hit ratio over `hits + misses`; `0.0` if neither happened yet.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A listener that counts every lifecycle event.
#[derive(Debug, Default)]
pub struct StatsListener {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    removals: AtomicU64,
    clears: AtomicU64,
}

impl StatsListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> CacheListener<K, V> for StatsListener {
    fn on_event(&self, event: &CacheEvent<K, V>) {
        let counter = match event {
            CacheEvent::Hit(_) => &self.hits,
            CacheEvent::Miss(_) => &self.misses,
            CacheEvent::Insert(_, _) => &self.inserts,
            CacheEvent::Update(_, _, _) => &self.updates,
            CacheEvent::Evict(_, _) => &self.evictions,
            CacheEvent::Expire(_) => &self.expirations,
            CacheEvent::Remove(_) => &self.removals,
            CacheEvent::Clear(_) => &self.clears,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
