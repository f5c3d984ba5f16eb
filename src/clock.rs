// Monotonic clock abstraction
//
// The TTL expiration policies (src/expiration) need a source of "now" that
// can be swapped for a deterministic double in tests, so that expiration
// math never depends on a real sleep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A source of monotonic time.
///
/// Implementations must be monotonically non-decreasing: `now()` called
/// twice in sequence must never go backwards.
pub trait Clock: Send + Sync {
    /// The current instant, as measured by this clock.
    fn now(&self) -> Instant;
}

/// The platform's monotonic clock. Used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only advances when told to, for deterministic expiration
/// tests instead of real sleeps.
///
/// `VirtualClock` is cheaply cloneable; clones share the same underlying
/// counter, so advancing one clone advances every other.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Create a new virtual clock starting at time zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance the clock by `d`. Affects every handle sharing this clock.
    pub fn advance(&self, d: Duration) {
        self.elapsed_nanos
            .fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_advances_on_demand() {
        let clock = VirtualClock::new();
        let t0 = clock.now();
        clock.advance(Duration::from_millis(50));
        let t1 = clock.now();
        assert_eq!(t1 - t0, Duration::from_millis(50));
    }

    #[test]
    fn virtual_clock_clones_share_state() {
        let clock = VirtualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), handle.now());
    }

    #[test]
    fn system_clock_is_non_decreasing() {
        let clock = SystemClock;
        let t0 = clock.now();
        let t1 = clock.now();
        assert!(t1 >= t0);
    }
}
