use burrow_pool::{SimplePool, SyncPool};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::{thread, time::Duration};

// Far beyond the runtime of any test here: these scenarios exercise the
// rings, not the idle timeout.
const KEEP_ALIVE: Duration = Duration::from_secs(60);

fn counting_sync_pool(core: usize, max: usize) -> SyncPool<String> {
  let counter = AtomicUsize::new(0);
  SyncPool::new(core, max, KEEP_ALIVE, move || {
    counter.fetch_add(1, Ordering::SeqCst).to_string()
  })
}

#[test]
fn test_into_sync_carries_state_over() {
  let counter = AtomicUsize::new(0);
  let pool = SimplePool::new(2, 3, KEEP_ALIVE, move || {
    counter.fetch_add(1, Ordering::SeqCst).to_string()
  });

  // Warm the rings before converting.
  let a = pool.get();
  let b = pool.get();
  a.release();
  b.release();

  let pool = pool.into_sync();

  let a = pool.get();
  let b = pool.get();
  assert_eq!(*a, "0");
  assert_eq!(*b, "1");
  assert_eq!(pool.stats().created, 2, "no reconstruction after conversion");
}

#[test]
fn test_concurrent_acquire_release_neither_duplicates_nor_loses() {
  let pool = Arc::new(counting_sync_pool(4, 8));
  let in_flight = Arc::new(Mutex::new(BTreeSet::new()));

  let mut handles = Vec::new();
  for _ in 0..8 {
    let pool = Arc::clone(&pool);
    let in_flight = Arc::clone(&in_flight);
    handles.push(thread::spawn(move || {
      for _ in 0..500 {
        let node = pool.get();
        {
          // No two live leases may ever hold the same value.
          let mut set = in_flight.lock().unwrap();
          assert!(set.insert((*node).clone()), "duplicate lease observed");
        }
        {
          let mut set = in_flight.lock().unwrap();
          assert!(set.remove(&*node));
        }
        node.release();
      }
    }));
  }
  for handle in handles {
    handle.join().unwrap();
  }

  let stats = pool.stats();
  assert_eq!(stats.outstanding, 0);
  assert_eq!(stats.reused + stats.created, 8 * 500);
}

#[test]
fn test_shared_pool_serves_all_threads_from_one_ring_set() {
  // Retention (6) comfortably covers peak concurrency (4 threads), so a
  // released slot is always kept and reused rather than reconstructed.
  let pool = Arc::new(counting_sync_pool(2, 6));

  // Warm both core slots, then hand the pool to workers.
  let a = pool.get();
  let b = pool.get();
  a.release();
  b.release();

  let mut handles = Vec::new();
  for _ in 0..4 {
    let pool = Arc::clone(&pool);
    handles.push(thread::spawn(move || {
      for _ in 0..100 {
        let node = pool.get();
        // At most one slot per concurrently running thread can exist.
        let v: usize = node.parse().unwrap();
        assert!(v < 6, "unexpected construction burst: {v}");
        node.release();
      }
    }));
  }
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(pool.stats().outstanding, 0);
}
