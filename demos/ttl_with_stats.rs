// TTL cache with a stats listener
//
// Demonstrates a global TTL expiration policy, lazy expiration on `get`,
// the background sweeper, and a `StatsListener` tracking hit/miss counts.

use cachekit::eviction::lru::Lru;
use cachekit::expiration::global::GlobalTtl;
use cachekit::events::logging::LoggingListener;
use cachekit::events::stats::StatsListener;
use cachekit::{Cache, Sweeper};
use std::sync::Arc;
use std::time::Duration;

fn main() -> cachekit::Result<()> {
    tracing_subscriber::fmt::init();
    println!("=== cachekit: TTL cache with stats ===\n");

    let expiration = GlobalTtl::new(Duration::from_millis(50))?;
    let cache = Arc::new(parking_lot::Mutex::new(Cache::with_expiration(
        100,
        Box::new(Lru::new()),
        Box::new(expiration),
    )?));

    let stats = Arc::new(StatsListener::new());
    cache.lock().add_listener(stats.clone());
    cache.lock().add_listener(Arc::new(LoggingListener::new()));
    println!("✓ Cache created with a 50ms global TTL, a stats listener, and a tracing listener");
    println!("  (run with RUST_LOG=debug to see per-event trace output)");

    cache.lock().put("session:42", "active");
    println!("  get(session:42) = {:?}", cache.lock().get(&"session:42"));

    let sweep_cache = Arc::clone(&cache);
    let _sweeper = Sweeper::start(Duration::from_millis(20), move || {
        sweep_cache.lock().remove_expired()
    });
    println!("✓ Background sweeper started (20ms interval)");

    std::thread::sleep(Duration::from_millis(100));
    println!("  get(session:42) after expiry = {:?}", cache.lock().get(&"session:42"));

    let snapshot = stats.snapshot();
    println!("\nStats snapshot:");
    println!("  hits = {}", snapshot.hits);
    println!("  misses = {}", snapshot.misses);
    println!("  expirations = {}", snapshot.expirations);
    println!("  hit ratio = {:.2}", snapshot.hit_ratio());

    println!("\n=== Done ===");
    Ok(())
}
