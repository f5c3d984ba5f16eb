// LFU eviction policy
//
// Classic O(1) LFU: a key -> frequency map, a frequency -> recency-sequence
// map, and a tracked minimum frequency. `min_frequency` can go stale after a
// remove (its bucket may have emptied); it is repaired lazily, inside
// `select_victim`, by a linear scan over the tracked frequencies.

use super::list::{IntrusiveList, NodeId};
use super::EvictionPolicy;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

struct Tracked {
    frequency: u64,
    node: NodeId,
}

/// Least-frequently-used eviction, ties broken by recency within the
/// frequency bucket.
pub struct Lfu<K> {
    buckets: HashMap<u64, IntrusiveList<K>>,
    tracked: HashMap<K, Tracked>,
    min_frequency: u64,
}

impl<K> Lfu<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            tracked: HashMap::new(),
            min_frequency: 0,
        }
    }

    /// Move `key` from its current frequency bucket to `new_freq`, creating
    /// the destination bucket on demand and dropping the source bucket if it
    /// becomes empty.
    fn bump(&mut self, key: &K, old_freq: u64, new_freq: u64) -> NodeId {
        let old_bucket = self.buckets.get_mut(&old_freq).expect("tracked key has a bucket");
        let node = self.tracked.get(key).expect("tracked key").node;
        old_bucket.unlink(node);
        if old_bucket.is_empty() {
            self.buckets.remove(&old_freq);
        }
        let new_bucket = self.buckets.entry(new_freq).or_default();
        new_bucket.push_front(key.clone())
    }
}

impl<K> Default for Lfu<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Debug for Lfu<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lfu")
            .field("tracked", &self.tracked.len())
            .field("min_frequency", &self.min_frequency)
            .finish()
    }
}

impl<K> EvictionPolicy<K> for Lfu<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        let node = self.buckets.entry(1).or_default().push_front(key.clone());
        self.tracked.insert(
            key,
            Tracked {
                frequency: 1,
                node,
            },
        );
        self.min_frequency = 1;
    }

    fn on_access(&mut self, key: &K) {
        let Some(old_freq) = self.tracked.get(key).map(|t| t.frequency) else {
            return;
        };
        let new_freq = old_freq + 1;
        let node = self.bump(key, old_freq, new_freq);
        if let Some(t) = self.tracked.get_mut(key) {
            t.frequency = new_freq;
            t.node = node;
        }
        if old_freq == self.min_frequency && !self.buckets.contains_key(&old_freq) {
            self.min_frequency = new_freq;
        }
    }

    fn on_remove(&mut self, key: &K) {
        let Some(removed) = self.tracked.remove(key) else {
            return;
        };
        if let Some(bucket) = self.buckets.get_mut(&removed.frequency) {
            bucket.unlink(removed.node);
            if bucket.is_empty() {
                self.buckets.remove(&removed.frequency);
            }
        }
        // min_frequency may now be stale; select_victim repairs it lazily.
    }

    fn select_victim(&self) -> Result<K> {
        if self.tracked.is_empty() {
            return Err(Error::illegal_state(
                "select_victim called on an empty LFU policy",
            ));
        }
        let mut min_freq = self.min_frequency;
        if !self
            .buckets
            .get(&min_freq)
            .is_some_and(|b| !b.is_empty())
        {
            min_freq = *self
                .buckets
                .keys()
                .min()
                .expect("non-empty tracked set has at least one bucket");
        }
        let bucket = &self.buckets[&min_freq];
        let id = bucket
            .back_id()
            .expect("recomputed min-frequency bucket is non-empty");
        Ok(bucket.value(id).clone())
    }

    fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.tracked.clear();
        self.min_frequency = 0;
    }
}
