// Logging collaborator
//
// Emits one `tracing` event per lifecycle event, at debug level. Not
// required by any invariant; useful for ad-hoc observability while
// developing against a cache.

use super::{CacheEvent, CacheListener};
use std::fmt::Debug;

/// A listener that traces every lifecycle event it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl LoggingListener {
    pub fn new() -> Self {
        Self
    }
}

impl<K, V> CacheListener<K, V> for LoggingListener
where
    K: Debug,
    V: Debug,
{
    fn on_event(&self, event: &CacheEvent<K, V>) {
        match event {
            CacheEvent::Hit(k) => tracing::debug!(key = ?k, "cache hit"),
            CacheEvent::Miss(k) => tracing::debug!(key = ?k, "cache miss"),
            CacheEvent::Insert(k, v) => tracing::debug!(key = ?k, value = ?v, "cache insert"),
            CacheEvent::Update(k, old, new) => {
                tracing::debug!(key = ?k, old = ?old, new = ?new, "cache update")
            }
            CacheEvent::Evict(k, v) => tracing::debug!(key = ?k, value = ?v, "cache evict"),
            CacheEvent::Expire(k) => tracing::debug!(key = ?k, "cache expire"),
            CacheEvent::Remove(k) => tracing::debug!(key = ?k, "cache remove"),
            CacheEvent::Clear(count) => tracing::debug!(count, "cache clear"),
        }
    }
}
