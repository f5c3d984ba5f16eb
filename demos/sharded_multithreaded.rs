// Sharded cache driven from multiple threads
//
// Demonstrates `ShardedWrapper`, where each thread can write to its own
// shard's lock without contending with the others.

use cachekit::eviction::lru::Lru;
use cachekit::{Cache, ShardedWrapper};
use std::sync::Arc;

fn main() -> cachekit::Result<()> {
    println!("=== cachekit: sharded cache, multiple writers ===\n");

    let cache = Arc::new(ShardedWrapper::new(
        4_000,
        |capacity| Cache::new(capacity, Box::new(Lru::new())),
        4,
    )?);
    println!(
        "✓ Sharded cache created: {} shards, {} total capacity",
        cache.shard_count(),
        cache.capacity()
    );

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500 {
                    cache.put(format!("worker{worker}-{i}"), worker * 1000 + i);
                }
            });
        }
    });
    println!("✓ 8 threads each inserted 500 entries");

    println!("  total size = {}", cache.size());
    println!(
        "  worker3-10 = {:?}",
        cache.get(&"worker3-10".to_string())
    );

    println!("\n=== Done ===");
    Ok(())
}
