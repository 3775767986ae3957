use burrow_cache::{BuildError, Cache, CacheBuilder, SegmentedCache};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_zero_segments_is_a_build_error() {
  let result = CacheBuilder::<String, String>::new().segments(0).build_segmented();
  assert_eq!(result.err(), Some(BuildError::ZeroSegments));
}

#[test]
fn test_basic_ops_across_many_keys() {
  let cache = CacheBuilder::new().segments(4).build_segmented().unwrap();

  let keys: Vec<_> = (0..100).map(|i| Arc::new(i)).collect();
  for k in &keys {
    cache.insert(k.clone(), **k * 10);
  }

  for k in &keys {
    assert_eq!(cache.get(k), Some(**k * 10));
  }

  assert!(cache.invalidate(&keys[17]));
  assert_eq!(cache.get(&keys[17]), None);
}

#[test]
fn test_clear_retriggers_every_loader() {
  let cache = CacheBuilder::new().segments(8).build_segmented().unwrap();
  let calls = AtomicUsize::new(0);
  let loader = |k: &Arc<u64>| {
    calls.fetch_add(1, Ordering::SeqCst);
    **k * 10
  };

  let keys: Vec<_> = (0..20u64).map(Arc::new).collect();
  for k in &keys {
    cache.get_with(k, &loader);
  }
  assert_eq!(calls.load(Ordering::SeqCst), 20);

  // Warm: no further loads.
  for k in &keys {
    cache.get_with(k, &loader);
  }
  assert_eq!(calls.load(Ordering::SeqCst), 20);

  cache.clear();

  // Every previously cached key misses again.
  for k in &keys {
    cache.get_with(k, &loader);
  }
  assert_eq!(calls.load(Ordering::SeqCst), 40);
}

#[test]
fn test_get_all_routes_across_segments() {
  use ahash::HashMap;

  let cache = CacheBuilder::new().segments(4).build_segmented().unwrap();

  let keys: Vec<_> = (0..10u64).map(Arc::new).collect();
  for k in keys.iter().take(5) {
    cache.insert(k.clone(), **k);
  }

  let batch_loader = |missing: &[Arc<u64>]| {
    let mut loaded = HashMap::default();
    for k in missing {
      loaded.insert(k.clone(), **k + 100);
    }
    loaded
  };

  let all = cache.get_all(&keys, &batch_loader);

  assert_eq!(all.len(), 10);
  for k in keys.iter().take(5) {
    assert_eq!(all.get(k), Some(&**k));
  }
  for k in keys.iter().skip(5) {
    assert_eq!(all.get(k), Some(&(**k + 100)));
  }
}

#[test]
fn test_concurrent_readers_and_writers() {
  let cache: Arc<SegmentedCache<u64, u64>> =
    Arc::new(CacheBuilder::new().segments(16).build_segmented().unwrap());
  let keys: Arc<Vec<Arc<u64>>> = Arc::new((0..64u64).map(Arc::new).collect());

  let mut handles = Vec::new();
  for t in 0..8u64 {
    let cache = Arc::clone(&cache);
    let keys = Arc::clone(&keys);
    handles.push(thread::spawn(move || {
      for round in 0..200u64 {
        for k in keys.iter() {
          if (**k + t + round) % 3 == 0 {
            cache.insert(k.clone(), **k + round);
          } else {
            // Either a hit or a fill; both yield a value for this key.
            let v = cache.get_with(k, &|k: &Arc<u64>| **k);
            assert!(v >= **k);
          }
        }
      }
    }));
  }

  for handle in handles {
    handle.join().unwrap();
  }

  // Every key is visible after the storm.
  for k in keys.iter() {
    assert!(cache.get(k).is_some());
  }
}
