// Basic LRU cache
//
// Demonstrates the bare `Cache` core with an LRU eviction policy and no
// expiration: the smallest useful configuration.

use cachekit::eviction::lru::Lru;
use cachekit::Cache;

fn main() -> cachekit::Result<()> {
    println!("=== cachekit: basic LRU cache ===\n");

    let mut cache = Cache::new(3, Box::new(Lru::new()))?;
    println!("✓ Cache created, capacity 3");

    cache.put("a", "apple");
    cache.put("b", "banana");
    cache.put("c", "cherry");
    println!("✓ Inserted a, b, c");

    // Touching "a" makes it most-recently-used, so "b" is evicted next.
    println!("  get(a) = {:?}", cache.get(&"a"));
    cache.put("d", "date");
    println!("✓ Inserted d (capacity exceeded)");

    println!("\nFinal contents:");
    for key in ["a", "b", "c", "d"] {
        println!("  {key} present: {}", cache.contains(&key));
    }

    println!("\n=== Done ===");
    Ok(())
}
