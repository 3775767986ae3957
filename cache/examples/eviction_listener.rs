//! Watching entries leave the cache, with their causes.

use burrow_cache::{Cache, CacheBuilder, RemovalCause, RemoveListener};
use std::sync::Arc;
use std::time::Duration;
use std::thread;

struct PrintingListener;

impl RemoveListener<String, String> for PrintingListener {
  fn after_remove(&self, key: Option<&String>, value: &String, cause: RemovalCause) {
    match key {
      Some(key) => println!("removed {key:?} = {value:?}: {cause}"),
      None => println!("removed <collected> = {value:?}: {cause}"),
    }
  }
}

fn main() {
  let cache = CacheBuilder::new()
    .time_to_live(Duration::from_millis(200))
    .remove_listener(PrintingListener)
    .build_sync_weak();

  let short_lived = Arc::new("short-lived".to_string());
  let replaced = Arc::new("replaced".to_string());
  let explicit = Arc::new("explicit".to_string());

  cache.insert(short_lived.clone(), "a".to_string());
  cache.insert(replaced.clone(), "b".to_string());
  cache.insert(explicit.clone(), "c".to_string());

  // Replaced: the overwrite reports the displaced value.
  cache.insert(replaced.clone(), "b2".to_string());

  // Explicit: a manual invalidation.
  cache.invalidate(&explicit);

  // Expired: reclaimed lazily by the next touch after the TTL.
  thread::sleep(Duration::from_millis(400));
  let _ = cache.get(&short_lived);

  // Collected: drop the last strong reference to a key, then sweep.
  let transient = Arc::new("transient".to_string());
  cache.insert(transient.clone(), "d".to_string());
  drop(transient);
  cache.clean_up();
}
