use crate::node::{NodeSink, PoolNode, Ring, Slot};
use crate::stats::PoolStats;
use crate::sync::SyncPool;

use core::fmt;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sizing and retention parameters shared by both pool variants.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PoolConfig {
  pub(crate) core_size: usize,
  pub(crate) max_size: usize,
  pub(crate) keep_alive: Duration,
}

/// What `get` should do once the rings have been consulted.
///
/// Construction is carried out by the caller so the factory runs with no
/// borrow or lock held on the pool interior.
pub(crate) enum Acquire<T> {
  Idle(Slot<T>),
  BuildCore,
  BuildExcess,
}

/// The rings and counters of a pool, behind whatever synchronization the
/// owning variant provides.
pub(crate) struct PoolInner<T> {
  /// Idle core slots, oldest release at the front.
  core_idle: VecDeque<Slot<T>>,
  /// Idle excess slots, oldest release at the front.
  excess_idle: VecDeque<Slot<T>>,
  /// Core slots ever constructed; never exceeds `core_size` and never
  /// decreases.
  core_created: usize,
  outstanding: u64,
  created: u64,
  reused: u64,
  idle_evicted: u64,
  discarded: u64,
}

impl<T> PoolInner<T> {
  pub(crate) fn new() -> Self {
    Self {
      core_idle: VecDeque::new(),
      excess_idle: VecDeque::new(),
      core_created: 0,
      outstanding: 0,
      created: 0,
      reused: 0,
      idle_evicted: 0,
      discarded: 0,
    }
  }

  /// Picks the next lease source: oldest idle core slot, a fresh core
  /// slot while the allotment lasts, oldest idle excess slot, or a fresh
  /// excess slot. Timed-out excess slots are swept first.
  pub(crate) fn acquire(&mut self, config: &PoolConfig, now: Instant) -> Acquire<T> {
    self.sweep(config, now);

    if let Some(slot) = self.core_idle.pop_front() {
      self.reused += 1;
      self.outstanding += 1;
      return Acquire::Idle(slot);
    }
    if self.core_created < config.core_size {
      self.core_created += 1;
      self.created += 1;
      self.outstanding += 1;
      return Acquire::BuildCore;
    }
    if let Some(slot) = self.excess_idle.pop_front() {
      self.reused += 1;
      self.outstanding += 1;
      return Acquire::Idle(slot);
    }
    // Rings exhausted: grow. Outstanding leases may exceed `max_size`;
    // the cap bounds retention, not growth.
    self.created += 1;
    self.outstanding += 1;
    Acquire::BuildExcess
  }

  /// Returns a slot to its originating ring, stamping the release time.
  ///
  /// An excess slot is retained only while total retained slots stay
  /// within `max_size`; past that it is discarded on the spot.
  pub(crate) fn put_back(&mut self, mut slot: Slot<T>, config: &PoolConfig, now: Instant) {
    self.outstanding -= 1;
    slot.released_at = now;
    match slot.ring {
      Ring::Core => self.core_idle.push_back(slot),
      Ring::Excess => {
        if self.core_created + self.excess_idle.len() < config.max_size {
          self.excess_idle.push_back(slot);
        } else {
          self.discarded += 1;
        }
      }
    }
  }

  /// Drops idle excess slots that have outlived `keep_alive`.
  ///
  /// The ring is release-ordered, so the scan stops at the first slot
  /// still inside its window. Core slots are never touched.
  pub(crate) fn sweep(&mut self, config: &PoolConfig, now: Instant) {
    while let Some(front) = self.excess_idle.front() {
      if now.duration_since(front.released_at) > config.keep_alive {
        self.excess_idle.pop_front();
        self.idle_evicted += 1;
      } else {
        break;
      }
    }
  }

  pub(crate) fn stats(&self) -> PoolStats {
    PoolStats {
      created: self.created,
      reused: self.reused,
      idle_evicted: self.idle_evicted,
      discarded: self.discarded,
      outstanding: self.outstanding,
    }
  }
}

/// The unsynchronized object pool.
///
/// Backed by a `RefCell`, which makes the type `!Sync`: unsynchronized use
/// is confined to one thread by the compiler. Convert with
/// [`into_sync`](SimplePool::into_sync) when the pool must be shared.
///
/// The pool retains up to `core_size` slots permanently (constructed
/// lazily, one per `get` that finds no idle slot) and overflow "excess"
/// slots up to `max_size` total retention. Idle slots are reused oldest
/// release first; idle excess slots older than `keep_alive` are dropped by
/// the sweep that runs on every `get` and on
/// [`clean_up`](SimplePool::clean_up).
///
/// `get` never blocks and never fails except by a panicking factory.
pub struct SimplePool<T> {
  inner: RefCell<PoolInner<T>>,
  factory: Box<dyn Fn() -> T + Send + Sync>,
  config: PoolConfig,
}

impl<T> fmt::Debug for SimplePool<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SimplePool")
      .field("core_size", &self.config.core_size)
      .field("max_size", &self.config.max_size)
      .field("keep_alive", &self.config.keep_alive)
      .finish_non_exhaustive()
  }
}

impl<T> SimplePool<T> {
  /// Creates a pool with `core_size` permanent slots, `max_size` total
  /// retention, and a `keep_alive` window for idle excess slots.
  ///
  /// A `max_size` below `core_size` is raised to it, keeping the sizing
  /// invariant without a fallible constructor.
  pub fn new<F>(core_size: usize, max_size: usize, keep_alive: Duration, factory: F) -> Self
  where
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self {
      inner: RefCell::new(PoolInner::new()),
      factory: Box::new(factory),
      config: PoolConfig {
        core_size,
        max_size: max_size.max(core_size),
        keep_alive,
      },
    }
  }

  /// Leases a value, reusing the oldest idle slot or constructing a new
  /// one via the factory.
  pub fn get(&self) -> PoolNode<'_, T> {
    let now = Instant::now();
    let decision = self.inner.borrow_mut().acquire(&self.config, now);
    // The borrow is released before the factory runs.
    let slot = match decision {
      Acquire::Idle(slot) => slot,
      Acquire::BuildCore => Slot::new((self.factory)(), Ring::Core, now),
      Acquire::BuildExcess => Slot::new((self.factory)(), Ring::Excess, now),
    };
    PoolNode::new(self, slot)
  }

  /// Drops idle excess slots that have outlived the keep-alive window.
  pub fn clean_up(&self) {
    self.inner.borrow_mut().sweep(&self.config, Instant::now());
  }

  pub fn stats(&self) -> PoolStats {
    self.inner.borrow().stats()
  }

  /// Converts into the mutex-serialized variant, carrying rings, counters,
  /// and configuration over unchanged.
  pub fn into_sync(self) -> SyncPool<T> {
    SyncPool::from_parts(self.inner.into_inner(), self.factory, self.config)
  }
}

impl<T> NodeSink<T> for SimplePool<T> {
  fn put_back(&self, slot: Slot<T>) {
    self
      .inner
      .borrow_mut()
      .put_back(slot, &self.config, Instant::now());
  }
}
