//! Reusing expensive-to-construct workers through the pool.

use burrow_pool::SimplePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct Worker {
  id: usize,
}

impl Worker {
  fn process(&self, job: &str) {
    println!("worker {} processing {job}", self.id);
  }
}

fn main() {
  let ids = AtomicUsize::new(0);
  let pool = SimplePool::new(2, 4, Duration::from_secs(30), move || {
    let id = ids.fetch_add(1, Ordering::SeqCst);
    println!("constructing worker {id}");
    Worker { id }
  });

  for job in ["a", "b", "c", "d", "e", "f"] {
    // Each lease reuses the oldest idle worker; construction happens only
    // while the core allotment is still filling.
    let worker = pool.get();
    worker.process(job);
    worker.release();
  }

  let stats = pool.stats();
  println!(
    "created: {}, reused: {}, outstanding: {}",
    stats.created, stats.reused, stats.outstanding
  );
}
