use crate::cache::Cache;
use crate::error::CacheError;
use crate::metrics::MetricsSnapshot;
use crate::shared::CacheShared;
use crate::store::{hash_key, WeakStore};

use core::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;
use crossbeam_utils::CachePadded;
use parking_lot::Mutex;

/// The default number of segments for a [`SegmentedCache`].
pub const DEFAULT_SEGMENTS: usize = 32;

/// A cache partitioned into a fixed array of independently locked
/// [`WeakStore`] segments.
///
/// Every operation is routed to `segment[(hash(key) & 0x7fff_ffff) % N]`,
/// so contention is spread across N per-segment locks instead of one
/// global one. The segment count is fixed at construction and never
/// changes.
///
/// Within one segment, operations are linearized by that segment's mutex.
/// Across segments there is no ordering guarantee: in particular,
/// [`clear`](Cache::clear) empties one segment at a time and a concurrent
/// writer may repopulate an earlier segment before a later one is reached.
pub struct SegmentedCache<K, V> {
  segments: Box<[CachePadded<Mutex<WeakStore<K, V>>>]>,
  hasher: ahash::RandomState,
  shared: CacheShared<K, V>,
}

impl<K, V> fmt::Debug for SegmentedCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SegmentedCache")
      .field("segments", &self.segments.len())
      .field("time_to_live", &self.shared.time_to_live)
      .finish_non_exhaustive()
  }
}

impl<K, V> SegmentedCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub(crate) fn from_shared(shared: CacheShared<K, V>, segment_count: usize) -> Self {
    let mut segments = Vec::with_capacity(segment_count);
    for _ in 0..segment_count {
      segments.push(CachePadded::new(Mutex::new(WeakStore::new())));
    }

    Self {
      segments: segments.into_boxed_slice(),
      hasher: ahash::RandomState::new(),
      shared,
    }
  }

  /// Returns the mutex guarding the segment a key routes to.
  #[inline]
  fn segment_for(&self, key: &K) -> &Mutex<WeakStore<K, V>> {
    let hash = hash_key(&self.hasher, key);
    let index = (hash & 0x7fff_ffff) as usize % self.segments.len();
    &self.segments[index]
  }

  fn iter_segments(&self) -> impl Iterator<Item = &Mutex<WeakStore<K, V>>> {
    self.segments.iter().map(|padded| &**padded)
  }
}

impl<K, V> Cache<K, V> for SegmentedCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  fn contains(&self, key: &K) -> bool {
    self.shared.contains(&self.segment_for(key).lock(), key)
  }

  fn get(&self, key: &K) -> Option<V> {
    self.shared.read(&mut self.segment_for(key).lock(), key)
  }

  fn try_get(&self, key: &K) -> Result<V, CacheError> {
    self.shared.try_get(&mut self.segment_for(key).lock(), key)
  }

  fn get_with(&self, key: &Arc<K>, loader: &dyn Fn(&Arc<K>) -> V) -> V {
    if let Some(value) = self.shared.read(&mut self.segment_for(key).lock(), key) {
      return value;
    }

    // Segment lock released; the loader runs unlocked. Concurrent misses
    // on the same key may each invoke it; the last insert wins.
    let value = self.shared.load_one(key, loader);
    self.shared.insert(
      &mut self.segment_for(key).lock(),
      key,
      value.clone(),
      self.shared.time_to_live,
    );
    value
  }

  fn get_all(
    &self,
    keys: &[Arc<K>],
    batch_loader: &dyn Fn(&[Arc<K>]) -> HashMap<Arc<K>, V>,
  ) -> HashMap<Arc<K>, V> {
    let mut found = HashMap::default();
    let mut missing = Vec::new();
    for key in keys {
      // One key at a time: each visibility check runs under its own
      // segment's lock, and the dedup against `found`/`missing` is
      // handled inside the collect pass.
      self.shared.collect_present(
        &self.segment_for(key).lock(),
        std::slice::from_ref(key),
        &mut found,
        Some(&mut missing),
      );
    }

    if missing.is_empty() {
      return found;
    }

    let loaded = self.shared.load_batch(&missing, batch_loader);
    for (key, value) in loaded {
      self.shared.insert(
        &mut self.segment_for(&key).lock(),
        &key,
        value.clone(),
        self.shared.time_to_live,
      );
      found.insert(key, value);
    }
    found
  }

  fn get_present(&self, keys: &[Arc<K>]) -> HashMap<Arc<K>, V> {
    let mut found = HashMap::default();
    for key in keys {
      self.shared.collect_present(
        &self.segment_for(key).lock(),
        std::slice::from_ref(key),
        &mut found,
        None,
      );
    }
    found
  }

  fn insert(&self, key: Arc<K>, value: V) {
    self.shared.insert(
      &mut self.segment_for(&key).lock(),
      &key,
      value,
      self.shared.time_to_live,
    );
  }

  fn insert_with_ttl(&self, key: Arc<K>, value: V, ttl: Duration) {
    self
      .shared
      .insert(&mut self.segment_for(&key).lock(), &key, value, Some(ttl));
  }

  fn renew(&self, key: &K) -> bool {
    self.shared.renew(
      &mut self.segment_for(key).lock(),
      key,
      self.shared.time_to_live,
    )
  }

  fn renew_with_ttl(&self, key: &K, ttl: Duration) -> bool {
    self
      .shared
      .renew(&mut self.segment_for(key).lock(), key, Some(ttl))
  }

  fn invalidate(&self, key: &K) -> bool {
    self.shared.invalidate(&mut self.segment_for(key).lock(), key)
  }

  fn clear(&self) {
    for segment in self.iter_segments() {
      self.shared.clear(&mut segment.lock());
    }
  }

  fn clean_up(&self) {
    for segment in self.iter_segments() {
      self.shared.clean_up(&mut segment.lock());
    }
  }

  fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}
