// cachekit
//
// A generic in-process key-value cache with pluggable eviction and
// expiration strategies, an event bus for lifecycle notifications, and
// concurrency wrappers for sharing a cache across threads.
//
// cachekit combines a handful of small, swappable collaborators around one
// core:
// - **Eviction policies**: LRU and LFU, selected at construction time
// - **Expiration policies**: none, a global TTL, or per-key TTLs
// - **Event bus**: synchronous or background-dispatched listeners for hits,
//   misses, inserts, updates, evictions, expirations, removals and clears
// - **Concurrency wrappers**: a single-lock wrapper and a sharded wrapper
//
// Quick Start
//
// ```rust
// use cachekit::{Cache, eviction::lru::Lru};
//
// let mut cache = Cache::new(2, Box::new(Lru::new())).unwrap();
// cache.put("a", 1);
// cache.put("b", 2);
// cache.put("c", 3); // evicts "a", the least recently used
//
// assert_eq!(cache.get(&"a"), None);
// assert_eq!(cache.get(&"c"), Some(3));
// ```

pub use crate::cache::Cache;
pub use clock::{Clock, SystemClock, VirtualClock};
pub use concurrency::{ExclusiveWrapper, ShardedWrapper};
pub use error::{Error, Result};
pub use events::{CacheEvent, CacheListener, ListenerHandle};
pub use sweeper::Sweeper;

pub mod error;

pub mod clock;
pub mod concurrency;
pub mod events;
pub mod eviction;
pub mod expiration;
pub mod sweeper;

pub(crate) mod cache;
