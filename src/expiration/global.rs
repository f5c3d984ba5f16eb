// Global TTL expiration
//
// A single positive duration applied to every key at insert time,
// regardless of any custom TTL the caller supplies. Changing the global
// duration only affects subsequently inserted keys.

use super::ExpirationPolicy;
use crate::clock::Clock;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed-duration expiration applied uniformly to every inserted key.
pub struct GlobalTtl<K> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K> GlobalTtl<K>
where
    K: Eq + Hash,
{
    /// Construct a Global TTL policy using the platform's monotonic clock.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `ttl` is zero.
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_clock(ttl, Arc::new(crate::clock::SystemClock))
    }

    /// Construct a Global TTL policy against an injected clock (tests use a
    /// `VirtualClock` so expiration can be asserted without real sleeps).
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if ttl.is_zero() {
            return Err(Error::invalid_argument(
                "global TTL must be a positive duration",
            ));
        }
        Ok(Self {
            clock,
            ttl,
            deadlines: HashMap::new(),
        })
    }

    /// Change the duration applied to subsequently inserted keys. Deadlines
    /// already recorded are left untouched.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `ttl` is zero.
    pub fn set_global_ttl(&mut self, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::invalid_argument(
                "global TTL must be a positive duration",
            ));
        }
        self.ttl = ttl;
        Ok(())
    }
}

impl<K> fmt::Debug for GlobalTtl<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalTtl")
            .field("ttl", &self.ttl)
            .field("tracked", &self.deadlines.len())
            .finish()
    }
}

impl<K> ExpirationPolicy<K> for GlobalTtl<K>
where
    K: Eq + Hash + Clone + Send + fmt::Debug,
{
    fn on_insert(&mut self, key: K, _custom_ttl: Option<Duration>) {
        let deadline = self.clock.now() + self.ttl;
        self.deadlines.insert(key, deadline);
    }

    fn on_access(&mut self, _key: &K) {
        // fixed TTL: access never slides the deadline
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    fn policy(ttl_ms: u64) -> (GlobalTtl<&'static str>, VirtualClock) {
        let clock = VirtualClock::new();
        let policy = GlobalTtl::with_clock(Duration::from_millis(ttl_ms), Arc::new(clock.clone()))
            .unwrap();
        (policy, clock)
    }

    #[test]
    fn zero_ttl_is_invalid_argument() {
        let err = GlobalTtl::<&str>::new(Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn scenario_s3_global_ttl_lazy_expiration() {
        let (mut p, clock) = policy(50);
        p.on_insert("k", None);

        clock.advance(Duration::from_millis(30));
        assert!(!p.is_expired(&"k"));

        clock.advance(Duration::from_millis(30)); // t = 60ms
        assert!(p.is_expired(&"k"));
        assert_eq!(p.collect_expired(), vec!["k"]);
    }

    #[test]
    fn custom_ttl_is_ignored() {
        let (mut p, clock) = policy(50);
        // a custom TTL is passed but Global TTL ignores it entirely
        p.on_insert("k", Some(Duration::from_secs(1000)));
        clock.advance(Duration::from_millis(60));
        assert!(p.is_expired(&"k"));
    }

    #[test]
    fn scenario_s8_changing_global_ttl_does_not_alter_existing_deadlines() {
        let (mut p, clock) = policy(50);
        p.on_insert("old", None);
        p.set_global_ttl(Duration::from_millis(200)).unwrap();
        p.on_insert("new", None);

        clock.advance(Duration::from_millis(60));
        assert!(p.is_expired(&"old"));
        assert!(!p.is_expired(&"new"));
    }

    #[test]
    fn time_to_live_reports_zero_past_deadline() {
        let (mut p, clock) = policy(50);
        p.on_insert("k", None);
        clock.advance(Duration::from_millis(100));
        assert_eq!(p.time_to_live(&"k"), Some(Duration::ZERO));
    }
}
