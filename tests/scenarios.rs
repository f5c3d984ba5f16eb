// End-to-end scenario tests, driven entirely through the public API.

use cachekit::clock::VirtualClock;
use cachekit::events::stats::StatsListener;
use cachekit::eviction::lfu::Lfu;
use cachekit::eviction::lru::Lru;
use cachekit::expiration::global::GlobalTtl;
use cachekit::expiration::per_key::PerKeyTtl;
use cachekit::{Cache, ExclusiveWrapper, Result, ShardedWrapper, Sweeper};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn scenario_s1_lru_evicts_least_recently_used() -> Result<()> {
    let mut cache = Cache::new(2, Box::new(Lru::new()))?;
    cache.put("a", 1);
    cache.put("b", 2);
    cache.get(&"a"); // "a" is now most recently used
    cache.put("c", 3); // evicts "b"

    assert!(cache.contains(&"a"));
    assert!(!cache.contains(&"b"));
    assert!(cache.contains(&"c"));
    Ok(())
}

#[test]
fn scenario_s2_lfu_evicts_least_frequently_used() -> Result<()> {
    let mut cache = Cache::new(2, Box::new(Lfu::new()))?;
    cache.put("a", 1);
    cache.put("b", 2);
    cache.get(&"a");
    cache.get(&"a");
    cache.put("c", 3); // "b" has frequency 1, lowest, and is evicted

    assert!(cache.contains(&"a"));
    assert!(!cache.contains(&"b"));
    assert!(cache.contains(&"c"));
    Ok(())
}

#[test]
fn scenario_s3_global_ttl_expires_entries_lazily() -> Result<()> {
    let clock = VirtualClock::new();
    let expiration = GlobalTtl::with_clock(Duration::from_millis(50), Arc::new(clock.clone()))?;
    let mut cache = Cache::with_expiration(10, Box::new(Lru::new()), Box::new(expiration))?;

    cache.put("session", "alive");
    clock.advance(Duration::from_millis(100));

    assert_eq!(cache.get(&"session"), None);
    assert!(!cache.contains(&"session"));
    Ok(())
}

#[test]
fn scenario_s4_per_key_ttl_overrides_the_default() -> Result<()> {
    let clock = VirtualClock::new();
    let expiration = PerKeyTtl::with_clock(Some(Duration::from_secs(3600)), Arc::new(clock.clone()));
    let mut cache = Cache::with_expiration(10, Box::new(Lru::new()), Box::new(expiration))?;

    cache.put("default-ttl", 1); // inherits the one-hour default
    cache.put_with_ttl("short-lived", 2, Some(Duration::from_millis(10)));

    clock.advance(Duration::from_millis(50));
    assert!(cache.contains(&"default-ttl"));
    assert!(!cache.contains(&"short-lived"));
    Ok(())
}

#[test]
fn scenario_s5_sharded_wrapper_under_parallel_writers() -> Result<()> {
    let cache = Arc::new(ShardedWrapper::new(
        1000,
        |capacity| Cache::new(capacity, Box::new(Lru::new())),
        4,
    )?);

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..100 {
                    cache.put(format!("w{worker}-{i}"), worker * 100 + i);
                }
            });
        }
    });

    assert_eq!(cache.size(), 400);
    for worker in 0..4 {
        for i in 0..100 {
            let key = format!("w{worker}-{i}");
            assert_eq!(cache.get(&key), Some(worker * 100 + i));
        }
    }
    Ok(())
}

#[test]
fn scenario_s6_a_slow_listener_never_blocks_the_producer() -> Result<()> {
    let cache = Arc::new(ExclusiveWrapper::new(Cache::new(
        1000,
        Box::new(Lru::new()),
    )?));

    struct SlowListener(Arc<AtomicU64>);
    impl cachekit::CacheListener<u64, u64> for SlowListener {
        fn on_event(&self, _event: &cachekit::CacheEvent<u64, u64>) {
            std::thread::sleep(Duration::from_millis(5));
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let dispatcher: Arc<cachekit::events::dispatcher::AsyncDispatcher<u64, u64>> =
        Arc::new(cachekit::events::dispatcher::AsyncDispatcher::new());
    let processed = Arc::new(AtomicU64::new(0));
    dispatcher.add_listener(cachekit::ListenerHandle::new(Arc::new(SlowListener(
        Arc::clone(&processed),
    ))));

    let dispatcher_as_listener: Arc<dyn cachekit::CacheListener<u64, u64>> = dispatcher.clone();
    cache.add_listener(dispatcher_as_listener);

    let started = std::time::Instant::now();
    for i in 0..100u64 {
        cache.put(i, i);
    }
    // The slow listener sleeps 5ms per event; 100 events would take 500ms
    // synchronously. The dispatcher must decouple the producer from that.
    assert!(started.elapsed() < Duration::from_millis(200));

    dispatcher.stop();
    assert_eq!(processed.load(Ordering::SeqCst), 100);
    Ok(())
}

#[test]
fn stats_listener_tracks_hits_and_misses_end_to_end() -> Result<()> {
    let mut cache = Cache::new(10, Box::new(Lru::new()))?;
    let stats = Arc::new(StatsListener::new());
    cache.add_listener(stats.clone());

    cache.put("k", 1);
    cache.get(&"k");
    cache.get(&"missing");

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.inserts, 1);
    assert_eq!(snapshot.hits, 1);
    assert_eq!(snapshot.misses, 1);
    Ok(())
}

#[test]
fn background_sweeper_removes_expired_entries_without_a_get() -> Result<()> {
    let clock = VirtualClock::new();
    let expiration = GlobalTtl::with_clock(Duration::from_millis(10), Arc::new(clock.clone()))?;
    let cache = Arc::new(ExclusiveWrapper::new(Cache::with_expiration(
        10,
        Box::new(Lru::new()),
        Box::new(expiration),
    )?));
    cache.put("k", 1);
    clock.advance(Duration::from_millis(50));

    let sweep_cache = Arc::clone(&cache);
    let mut sweeper = Sweeper::start(Duration::from_millis(10), move || {
        sweep_cache.remove_expired()
    });
    std::thread::sleep(Duration::from_millis(60));
    sweeper.stop();

    assert_eq!(cache.size(), 0);
    Ok(())
}
