// Background sweeper
//
// A convenience thread that periodically calls a cache's `remove_expired`.
// Not part of the core: nothing here is required to satisfy invariants,
// since lazy expiration on `get`/`contains` is already correct on its own.
// This only bounds how long an unread expired entry can sit in memory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Owns a background thread that calls `sweep` on a fixed interval until
/// stopped. Dropping the sweeper stops it, joining the thread.
pub struct Sweeper {
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn a thread that calls `sweep()` every `interval`, logging how
    /// many entries it removed whenever that count is nonzero.
    pub fn start<F>(interval: Duration, sweep: F) -> Self
    where
        F: Fn() -> usize + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = Arc::clone(&shutdown);
        let join = std::thread::Builder::new()
            .name("cachekit-sweeper".to_string())
            .spawn(move || {
                while !worker_shutdown.load(Ordering::Acquire) {
                    std::thread::sleep(interval);
                    if worker_shutdown.load(Ordering::Acquire) {
                        break;
                    }
                    let removed = sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "background sweep removed expired entries");
                    }
                }
            })
            .expect("failed to spawn sweeper thread");
        Self {
            shutdown,
            join: Some(join),
        }
    }

    /// Stop the sweeper and wait for its thread to exit. Idempotent.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
