// Per-key TTL expiration
//
// Each key may carry its own deadline. Precedence on insert is custom TTL,
// then the configured default, then infinite (no record). A TTL of zero or
// negative duration is treated as invalid and is simply not recorded —
// see DESIGN.md for why this implementation picked "skip" over raising
// `InvalidArgument` for that case.

use super::ExpirationPolicy;
use crate::clock::Clock;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-key expiration with an optional default duration.
pub struct PerKeyTtl<K> {
    clock: Arc<dyn Clock>,
    default_ttl: Option<Duration>,
    deadlines: HashMap<K, Instant>,
}

impl<K> PerKeyTtl<K>
where
    K: Eq + Hash,
{
    /// Construct a Per-Key TTL policy using the platform's monotonic clock.
    /// `default_ttl` of `None` means "infinite" for keys inserted without a
    /// custom TTL.
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self::with_clock(default_ttl, Arc::new(crate::clock::SystemClock))
    }

    /// Construct against an injected clock (tests use `VirtualClock`).
    pub fn with_clock(default_ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            default_ttl,
            deadlines: HashMap::new(),
        }
    }

    /// Change the default applied to keys inserted without a custom TTL.
    /// Does not touch deadlines already recorded.
    pub fn set_default_ttl(&mut self, default_ttl: Option<Duration>) {
        self.default_ttl = default_ttl;
    }

    /// Set an absolute deadline for `key`, tracked or not.
    pub fn set_expire_at(&mut self, key: K, deadline: Instant) {
        self.deadlines.insert(key, deadline);
    }

    /// Update the TTL (relative to now) of an already-tracked key. Returns
    /// `false` if `key` is not currently tracked with a deadline.
    pub fn update_ttl(&mut self, key: &K, ttl: Duration) -> bool
    where
        K: Clone,
    {
        if !self.deadlines.contains_key(key) {
            return false;
        }
        self.deadlines.insert(key.clone(), self.clock.now() + ttl);
        true
    }

    /// Remove a tracked deadline, making the key infinite-TTL. Returns
    /// `true` if a deadline was actually removed.
    pub fn remove_ttl(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }
}

impl<K> fmt::Debug for PerKeyTtl<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerKeyTtl")
            .field("default_ttl", &self.default_ttl)
            .field("tracked", &self.deadlines.len())
            .finish()
    }
}

impl<K> ExpirationPolicy<K> for PerKeyTtl<K>
where
    K: Eq + Hash + Clone + Send + fmt::Debug,
{
    fn on_insert(&mut self, key: K, custom_ttl: Option<Duration>) {
        let effective = custom_ttl.or(self.default_ttl);
        match effective {
            Some(ttl) if !ttl.is_zero() => {
                let deadline = self.clock.now() + ttl;
                self.deadlines.insert(key, deadline);
            }
            _ => {
                // zero/negative custom TTL, or no TTL at all: infinite, no record.
                self.deadlines.remove(&key);
            }
        }
    }

    fn on_access(&mut self, _key: &K) {
        // no sliding semantics in this variant
    }

    fn on_remove(&mut self, key: &K) {
        self.deadlines.remove(key);
    }

    fn clear(&mut self) {
        self.deadlines.clear();
    }

    fn is_expired(&self, key: &K) -> bool {
        match self.deadlines.get(key) {
            Some(deadline) => self.clock.now() > *deadline,
            None => false,
        }
    }

    fn collect_expired(&self) -> Vec<K> {
        let now = self.clock.now();
        self.deadlines
            .iter()
            .filter(|(_, deadline)| now > **deadline)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn time_to_live(&self, key: &K) -> Option<Duration> {
        let deadline = *self.deadlines.get(key)?;
        let now = self.clock.now();
        Some(if now >= deadline {
            Duration::ZERO
        } else {
            deadline - now
        })
    }
}
