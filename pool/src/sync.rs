use crate::node::{NodeSink, PoolNode, Ring, Slot};
use crate::pool::{Acquire, PoolConfig, PoolInner};
use crate::stats::PoolStats;

use core::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// The mutex-serialized object pool.
///
/// Behaviorally identical to [`SimplePool`](crate::SimplePool), with every
/// ring operation serialized behind one mutex so the pool can be shared
/// across threads without any locking by the caller. The factory runs with
/// the mutex released, so a slow construction does not stall releases.
pub struct SyncPool<T> {
  inner: Mutex<PoolInner<T>>,
  factory: Box<dyn Fn() -> T + Send + Sync>,
  config: PoolConfig,
}

impl<T> fmt::Debug for SyncPool<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SyncPool")
      .field("core_size", &self.config.core_size)
      .field("max_size", &self.config.max_size)
      .field("keep_alive", &self.config.keep_alive)
      .finish_non_exhaustive()
  }
}

impl<T> SyncPool<T> {
  /// Creates a synchronized pool directly; see
  /// [`SimplePool::new`](crate::SimplePool::new) for the sizing rules.
  pub fn new<F>(core_size: usize, max_size: usize, keep_alive: Duration, factory: F) -> Self
  where
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self {
      inner: Mutex::new(PoolInner::new()),
      factory: Box::new(factory),
      config: PoolConfig {
        core_size,
        max_size: max_size.max(core_size),
        keep_alive,
      },
    }
  }

  pub(crate) fn from_parts(
    inner: PoolInner<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    config: PoolConfig,
  ) -> Self {
    Self {
      inner: Mutex::new(inner),
      factory,
      config,
    }
  }

  /// Leases a value, reusing the oldest idle slot or constructing a new
  /// one via the factory.
  pub fn get(&self) -> PoolNode<'_, T> {
    let now = Instant::now();
    let decision = self.inner.lock().acquire(&self.config, now);
    // Lock released; the factory runs unlocked.
    let slot = match decision {
      Acquire::Idle(slot) => slot,
      Acquire::BuildCore => Slot::new((self.factory)(), Ring::Core, now),
      Acquire::BuildExcess => Slot::new((self.factory)(), Ring::Excess, now),
    };
    PoolNode::new(self, slot)
  }

  /// Drops idle excess slots that have outlived the keep-alive window.
  pub fn clean_up(&self) {
    self.inner.lock().sweep(&self.config, Instant::now());
  }

  pub fn stats(&self) -> PoolStats {
    self.inner.lock().stats()
  }
}

impl<T> NodeSink<T> for SyncPool<T> {
  fn put_back(&self, slot: Slot<T>) {
    self.inner.lock().put_back(slot, &self.config, Instant::now());
  }
}
