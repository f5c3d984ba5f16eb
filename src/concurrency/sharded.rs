// Sharded wrapper
//
// An array of independent (cache, rw-lock) shards. Routing hashes the key
// and takes it modulo the shard count, so each operation touches only one
// shard's lock — the point of this wrapper over `ExclusiveWrapper` is that
// two keys in different shards never contend.

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::eviction::EvictionPolicy;
use crate::events::{CacheListener, ListenerHandle};
use crate::expiration::ExpirationPolicy;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

/// A fixed-size array of independently-locked cache shards.
///
/// `size()` and `clear()` touch every shard in turn; neither is atomic
/// across shards (see DESIGN.md for the Open Question this resolves).
pub struct ShardedWrapper<K, V> {
    shards: Vec<RwLock<Cache<K, V>>>,
    total_capacity: usize,
}

impl<K, V> ShardedWrapper<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    /// Build `shard_count` shards, each with capacity
    /// `ceil(total_capacity / shard_count)` (minimum 1), via `factory`. The
    /// wrapper itself reports the originally requested `total_capacity`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `total_capacity` or `shard_count` is zero,
    /// or if `factory` itself fails.
    pub fn new<F>(total_capacity: usize, factory: F, shard_count: usize) -> Result<Self>
    where
        F: Fn(usize) -> Result<Cache<K, V>>,
    {
        if total_capacity == 0 {
            return Err(Error::invalid_argument("total capacity must be at least 1"));
        }
        if shard_count == 0 {
            return Err(Error::invalid_argument("shard count must be at least 1"));
        }
        let shard_capacity = total_capacity.div_ceil(shard_count).max(1);
        let mut shards = Vec::with_capacity(shard_count);
        for _ in 0..shard_count {
            shards.push(RwLock::new(factory(shard_capacity)?));
        }
        Ok(Self {
            shards,
            total_capacity,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// `hash(key) mod shard_count`.
    pub fn shard_index(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// The capacity of shard `index`.
    ///
    /// # Errors
    ///
    /// `Error::OutOfRange` if `index >= shard_count()`.
    pub fn shard_capacity(&self, index: usize) -> Result<usize> {
        self.shards
            .get(index)
            .map(|shard| shard.read().capacity())
            .ok_or_else(|| Error::out_of_range(format!("shard index {index} out of range")))
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.shards[self.shard_index(key)].write().get(key)
    }

    pub fn put(&self, key: K, value: V) {
        let idx = self.shard_index(&key);
        self.shards[idx].write().put(key, value);
    }

    pub fn put_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let idx = self.shard_index(&key);
        self.shards[idx].write().put_with_ttl(key, value, ttl);
    }

    pub fn remove(&self, key: &K) -> bool {
        self.shards[self.shard_index(key)].write().remove(key)
    }

    /// Clears every shard in turn. Not atomic across shards: a concurrent
    /// reader of a not-yet-cleared shard can still observe its entries
    /// while an already-cleared shard reports empty.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.shards[self.shard_index(key)].read().contains(key)
    }

    /// Sum of shard sizes. Shards are read one at a time rather than all
    /// under lock simultaneously, so a concurrent writer can make this a
    /// stale snapshot the instant it's returned.
    pub fn size(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().size()).sum()
    }

    /// The originally requested total capacity, not the sum of (rounded-up)
    /// per-shard capacities.
    pub fn capacity(&self) -> usize {
        self.total_capacity
    }

    pub fn remove_expired(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.write().remove_expired())
            .sum()
    }

    /// Run `f` with a mutable reference to the shard holding `key`.
    pub fn with_shard<F, R>(&self, key: &K, f: F) -> R
    where
        F: FnOnce(&mut Cache<K, V>) -> R,
    {
        let idx = self.shard_index(key);
        f(&mut self.shards[idx].write())
    }

    /// Run `f` against every shard in turn (sequentially, one shard's lock
    /// at a time).
    pub fn for_each_shard<F>(&self, mut f: F)
    where
        F: FnMut(&mut Cache<K, V>),
    {
        for shard in &self.shards {
            f(&mut shard.write());
        }
    }

    pub fn add_listener_to_all(
        &self,
        listener: Arc<dyn CacheListener<K, V>>,
    ) -> Vec<ListenerHandle<K, V>> {
        self.shards
            .iter()
            .map(|shard| shard.write().add_listener(Arc::clone(&listener)))
            .collect()
    }

    pub fn set_eviction_policy_factory<F>(&self, factory: F)
    where
        F: Fn() -> Box<dyn EvictionPolicy<K>>,
    {
        for shard in &self.shards {
            shard.write().set_eviction_policy(factory());
        }
    }

    pub fn set_expiration_policy_factory<F>(&self, factory: F)
    where
        F: Fn() -> Box<dyn ExpirationPolicy<K>>,
    {
        for shard in &self.shards {
            shard.write().set_expiration_policy(factory());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::lru::Lru;

    fn sharded(total_capacity: usize, shard_count: usize) -> ShardedWrapper<String, i32> {
        ShardedWrapper::new(
            total_capacity,
            |cap| Cache::new(cap, Box::new(Lru::new())),
            shard_count,
        )
        .unwrap()
    }

    #[test]
    fn zero_total_capacity_is_invalid_argument() {
        let err = ShardedWrapper::new(0, |cap| Cache::new(cap, Box::new(Lru::new())), 4)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn zero_shard_count_is_invalid_argument() {
        let err = ShardedWrapper::new(10, |cap| Cache::new(cap, Box::new(Lru::new())), 0)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn per_shard_capacity_rounds_up() {
        let cache = sharded(10, 4);
        assert_eq!(cache.shard_capacity(0).unwrap(), 3); // ceil(10/4)
        assert_eq!(cache.capacity(), 10); // wrapper still reports the requested total
    }

    #[test]
    fn shard_capacity_out_of_range_reports_error() {
        let cache = sharded(10, 4);
        let err = cache.shard_capacity(99).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn basic_roundtrip_through_the_owning_shard() {
        let cache = sharded(100, 4);
        cache.put("k".to_string(), 42);
        assert_eq!(cache.get(&"k".to_string()), Some(42));
    }

    #[test]
    fn clear_empties_every_shard() {
        let cache = sharded(100, 4);
        for i in 0..20 {
            cache.put(format!("k{i}"), i);
        }
        cache.clear();
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn scenario_s5_parallel_writers_on_disjoint_key_ranges() {
        let cache = Arc::new(sharded(2000, 4));
        std::thread::scope(|scope| {
            for shard in 0..4 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..250 {
                        cache.put(format!("shard{shard}-{i}"), (shard * 1000 + i) as i32);
                    }
                });
            }
        });

        assert_eq!(cache.size(), 1000);
        for shard in 0..4 {
            for i in 0..250 {
                let key = format!("shard{shard}-{i}");
                assert_eq!(cache.get(&key), Some((shard * 1000 + i) as i32));
            }
        }
    }
}
