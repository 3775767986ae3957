mod common;

use common::key;

use burrow_cache::{Cache, CacheBuilder, ThreadConfinedCache};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_entries_are_invisible_across_threads() {
  let cache: Arc<ThreadConfinedCache<String, String>> =
    Arc::new(CacheBuilder::new().build_thread_confined());

  let k = key("alpha");
  cache.insert(k.clone(), "main".to_string());
  assert_eq!(cache.get(&k), Some("main".to_string()));

  let cache2 = Arc::clone(&cache);
  let k2 = k.clone();
  thread::spawn(move || {
    // The spawned thread has its own private store: the main thread's
    // entry does not exist here.
    assert_eq!(cache2.get(&k2), None);

    cache2.insert(k2.clone(), "worker".to_string());
    assert_eq!(cache2.get(&k2), Some("worker".to_string()));
  })
  .join()
  .unwrap();

  // And the worker's entry never leaks back.
  assert_eq!(cache.get(&k), Some("main".to_string()));
}

#[test]
fn test_each_thread_runs_its_own_loader() {
  let cache: Arc<ThreadConfinedCache<String, String>> =
    Arc::new(CacheBuilder::new().build_thread_confined());
  let calls = Arc::new(AtomicUsize::new(0));

  let k = key("alpha");

  let mut handles = Vec::new();
  for _ in 0..4 {
    let cache = Arc::clone(&cache);
    let calls = Arc::clone(&calls);
    let k = k.clone();
    handles.push(thread::spawn(move || {
      let loader = |lk: &Arc<String>| {
        calls.fetch_add(1, Ordering::SeqCst);
        format!("loaded-{lk}")
      };
      // Two gets per thread: one miss, one hit, per private store.
      assert_eq!(cache.get_with(&k, &loader), "loaded-alpha");
      assert_eq!(cache.get_with(&k, &loader), "loaded-alpha");
    }));
  }
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(
    calls.load(Ordering::SeqCst),
    4,
    "one load per thread, not one per cache"
  );
}

#[test]
fn test_clear_acts_on_the_calling_thread_only() {
  let cache: Arc<ThreadConfinedCache<String, u32>> =
    Arc::new(CacheBuilder::new().build_thread_confined());

  let k = key("alpha");
  cache.insert(k.clone(), 1);

  let cache2 = Arc::clone(&cache);
  let k2 = k.clone();
  thread::spawn(move || {
    cache2.insert(k2.clone(), 2);
    cache2.clear();
    assert_eq!(cache2.get(&k2), None);
  })
  .join()
  .unwrap();

  // The worker's clear did not touch the main thread's store.
  assert_eq!(cache.get(&k), Some(1));
}

#[test]
fn test_metrics_are_shared_across_threads() {
  let cache: Arc<ThreadConfinedCache<String, u32>> =
    Arc::new(CacheBuilder::new().build_thread_confined());

  let k = key("alpha");
  cache.insert(k.clone(), 1);

  let cache2 = Arc::clone(&cache);
  let k2 = k.clone();
  thread::spawn(move || {
    cache2.insert(k2.clone(), 2);
  })
  .join()
  .unwrap();

  // Two inserts into two private stores, one shared counter set.
  assert_eq!(cache.metrics().inserts, 2);
}

#[test]
fn test_two_instances_do_not_share_stores() {
  let a: ThreadConfinedCache<String, u32> = CacheBuilder::new().build_thread_confined();
  let b: ThreadConfinedCache<String, u32> = CacheBuilder::new().build_thread_confined();

  let k = key("alpha");
  a.insert(k.clone(), 1);

  assert_eq!(b.get(&k), None);
  assert_eq!(a.get(&k), Some(1));
}
