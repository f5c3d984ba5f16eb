// Expiration (TTL) policies
//
// Tracks per-key deadlines on a monotonic clock and reports expired keys to
// the cache core. The core performs all removals itself; policies only
// answer questions and record/forget deadlines (lazy-deletion contract).

pub mod global;
pub mod none;
pub mod per_key;

use std::fmt::Debug;
use std::time::Duration;

/// Behaviour shared by every expiration strategy.
pub trait ExpirationPolicy<K>: Debug + Send {
    /// Record a deadline for a freshly-inserted key, honouring `custom_ttl`
    /// if the variant supports per-key overrides. No-op for variants with no
    /// storage (e.g. `NoExpiration`).
    fn on_insert(&mut self, key: K, custom_ttl: Option<Duration>);

    /// Hook for sliding-expiration variants. No-op for the fixed variants
    /// specified here.
    fn on_access(&mut self, key: &K);

    /// Drop any deadline recorded for `key`. A no-op if untracked.
    fn on_remove(&mut self, key: &K);

    /// Drop all tracked deadlines.
    fn clear(&mut self);

    /// `false` when `key` is untracked or has an infinite deadline; `true`
    /// only when `key` has a finite deadline strictly before `now`.
    fn is_expired(&self, key: &K) -> bool;

    /// A snapshot of keys whose deadline has already passed. Must not
    /// mutate any metadata (the core performs the actual removal).
    fn collect_expired(&self) -> Vec<K>;

    /// Remaining time until `key`'s deadline: `None` if untracked or
    /// infinite, `Duration::ZERO` if already past, remaining time otherwise.
    fn time_to_live(&self, key: &K) -> Option<Duration>;
}
