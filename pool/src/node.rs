use core::fmt;
use std::ops::Deref;
use std::time::Instant;

/// The ring a slot originates from.
///
/// A leased slot is in neither ring (it lives inside the caller's
/// [`PoolNode`] until released) but remembers where it came from so
/// release can return it there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ring {
  /// Permanent allotment: constructed at most `core_size` times, never
  /// idle-evicted.
  Core,
  /// Overflow beyond the core allotment, subject to keep-alive eviction.
  Excess,
}

/// One pooled value plus its bookkeeping.
pub(crate) struct Slot<T> {
  pub(crate) value: T,
  pub(crate) ring: Ring,
  pub(crate) released_at: Instant,
}

impl<T> Slot<T> {
  pub(crate) fn new(value: T, ring: Ring, now: Instant) -> Self {
    Self {
      value,
      ring,
      released_at: now,
    }
  }
}

/// The receiving side of a release; implemented by both pool variants so
/// one guard type serves both.
pub(crate) trait NodeSink<T> {
  fn put_back(&self, slot: Slot<T>);
}

/// A leased pool value.
///
/// The node dereferences to the pooled value. Dropping it, or calling
/// [`release`](PoolNode::release) to spell the hand-back out, returns the
/// slot to its originating ring and stamps its release time.
pub struct PoolNode<'a, T> {
  sink: &'a dyn NodeSink<T>,
  slot: Option<Slot<T>>,
}

impl<'a, T> PoolNode<'a, T> {
  pub(crate) fn new(sink: &'a dyn NodeSink<T>, slot: Slot<T>) -> Self {
    Self {
      sink,
      slot: Some(slot),
    }
  }

  /// A reference to the pooled value.
  pub fn value(&self) -> &T {
    &**self
  }

  /// Returns the node to its pool.
  ///
  /// Equivalent to dropping the node; provided so call sites can make the
  /// hand-back explicit.
  pub fn release(self) {}
}

impl<'a, T> Deref for PoolNode<'a, T> {
  type Target = T;

  fn deref(&self) -> &T {
    // The slot is only vacated by `Drop`, which consumes the node.
    &self.slot.as_ref().expect("pool node already released").value
  }
}

impl<'a, T> Drop for PoolNode<'a, T> {
  fn drop(&mut self) {
    if let Some(slot) = self.slot.take() {
      self.sink.put_back(slot);
    }
  }
}

impl<'a, T: fmt::Debug> fmt::Debug for PoolNode<'a, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PoolNode").field("value", &**self).finish()
  }
}
