//! Memoizing an expensive resolution step behind the `Cache` trait.
//!
//! The consumer owns its cache instance and passes it down explicitly;
//! there is no global registry. Keys are composite tuples, the shape used
//! when memoizing per-(source, target, operation) lookups.

use burrow_cache::{Cache, CacheBuilder};
use std::sync::Arc;
use std::time::Duration;

type ResolutionKey = (String, String, &'static str);

struct Resolver {
  cache: Box<dyn Cache<ResolutionKey, Arc<String>>>,
}

impl Resolver {
  fn new() -> Self {
    let cache = CacheBuilder::new()
      .time_to_live(Duration::from_secs(300))
      .segments(8)
      .build_segmented()
      .expect("segment count is non-zero");
    Self {
      cache: Box::new(cache),
    }
  }

  fn resolve(&self, key: &Arc<ResolutionKey>) -> Arc<String> {
    self.cache.get_with(key, &|k: &Arc<ResolutionKey>| {
      // Stand-in for the real work: building a converter, reflecting over
      // a type, compiling a plan.
      println!("resolving {:?}", k);
      Arc::new(format!("{}->{} via {}", k.0, k.1, k.2))
    })
  }
}

fn main() {
  let resolver = Resolver::new();

  let key = Arc::new((
    "OrderDto".to_string(),
    "OrderEntity".to_string(),
    "copy_properties",
  ));

  // First call resolves, the rest are hits.
  for _ in 0..3 {
    let plan = resolver.resolve(&key);
    println!("using plan: {plan}");
  }

  let metrics = resolver.cache.metrics();
  println!(
    "hits: {}, misses: {}, loads: {}",
    metrics.hits, metrics.misses, metrics.loads
  );
}
