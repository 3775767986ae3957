use burrow_pool::SimplePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{thread, time::Duration};

const KEEP_ALIVE: Duration = Duration::from_millis(400);
const SLEEP_MARGIN: Duration = Duration::from_millis(300);

fn counting_pool(core: usize, max: usize) -> SimplePool<String> {
  let counter = AtomicUsize::new(0);
  SimplePool::new(core, max, KEEP_ALIVE, move || {
    counter.fetch_add(1, Ordering::SeqCst).to_string()
  })
}

#[test]
fn test_core_slots_survive_any_idle_time() {
  let pool = counting_pool(1, 2);

  let node = pool.get();
  assert_eq!(*node, "0");
  node.release();

  thread::sleep(KEEP_ALIVE + SLEEP_MARGIN);

  let node = pool.get();
  assert_eq!(*node, "0", "core slots are never idle-evicted");
  assert_eq!(pool.stats().created, 1);
}

#[test]
fn test_idle_excess_is_dropped_by_clean_up() {
  let pool = counting_pool(1, 3);

  // One core lease plus two excess leases.
  let nodes: Vec<_> = (0..3).map(|_| pool.get()).collect();
  drop(nodes);

  thread::sleep(KEEP_ALIVE + SLEEP_MARGIN);
  pool.clean_up();

  let stats = pool.stats();
  assert_eq!(stats.idle_evicted, 2);

  // The next overflow lease reconstructs.
  let _core = pool.get();
  let fresh = pool.get();
  assert_eq!(*fresh, "3");
}

#[test]
fn test_sweep_runs_lazily_on_get() {
  let pool = counting_pool(1, 2);

  let core = pool.get();
  let excess = pool.get();
  assert_eq!(*excess, "1");
  excess.release();
  core.release();

  thread::sleep(KEEP_ALIVE + SLEEP_MARGIN);

  // No explicit clean_up: the get itself sweeps the stale excess slot,
  // takes the core slot, and the following get reconstructs.
  let first = pool.get();
  assert_eq!(*first, "0");
  let second = pool.get();
  assert_eq!(*second, "2");
  assert_eq!(pool.stats().idle_evicted, 1);
}

#[test]
fn test_warm_excess_is_not_swept_early() {
  let pool = counting_pool(1, 2);

  let core = pool.get();
  let excess = pool.get();
  excess.release();
  core.release();

  // Well inside the keep-alive window.
  pool.clean_up();
  assert_eq!(pool.stats().idle_evicted, 0);

  let _core = pool.get();
  let warm = pool.get();
  assert_eq!(*warm, "1", "warm excess slots are reused");
}
