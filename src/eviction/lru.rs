// LRU eviction policy
//
// A doubly-linked recency sequence (most-recently-used at the head, least
// at the tail) plus a key -> node-id index. Every operation in `EvictionPolicy`
// is O(1): insert and access move a node to the head, `select_victim` reads
// the tail without mutating.

use super::list::{IntrusiveList, NodeId};
use super::EvictionPolicy;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Least-recently-used eviction.
pub struct Lru<K> {
    sequence: IntrusiveList<K>,
    index: HashMap<K, NodeId>,
}

impl<K> Lru<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            sequence: IntrusiveList::new(),
            index: HashMap::new(),
        }
    }
}

impl<K> Default for Lru<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for Lru<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lru")
            .field("tracked", &self.index.len())
            .finish()
    }
}

impl<K> EvictionPolicy<K> for Lru<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        let id = self.sequence.push_front(key.clone());
        self.index.insert(key, id);
    }

    fn on_access(&mut self, key: &K) {
        if let Some(&id) = self.index.get(key) {
            self.sequence.move_to_front(id);
        }
    }

    fn on_remove(&mut self, key: &K) {
        if let Some(id) = self.index.remove(key) {
            self.sequence.unlink(id);
        }
    }

    fn select_victim(&self) -> Result<K> {
        let id = self
            .sequence
            .back_id()
            .ok_or_else(|| Error::illegal_state("select_victim called on an empty LRU policy"))?;
        Ok(self.sequence.value(id).clone())
    }

    fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn clear(&mut self) {
        self.sequence.clear();
        self.index.clear();
    }
}
