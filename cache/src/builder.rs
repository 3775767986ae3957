use crate::confined::ThreadConfinedCache;
use crate::error::BuildError;
use crate::listener::{
  CreateListener, Listeners, ReadListener, RemoveListener, UpdateListener,
};
use crate::segmented::{SegmentedCache, DEFAULT_SEGMENTS};
use crate::shared::CacheShared;
use crate::weak::{SyncWeakCache, WeakCache};

use core::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// A builder for every cache variant in the family.
///
/// The same configuration (default TTL and listener set) feeds any of the
/// four `build_*` terminals; the segment count only matters to
/// [`build_segmented`](CacheBuilder::build_segmented).
///
/// ```
/// use burrow_cache::{Cache, CacheBuilder};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let cache = CacheBuilder::new()
///   .time_to_live(Duration::from_secs(60))
///   .build_sync_weak();
///
/// let key = Arc::new("alpha".to_string());
/// cache.insert(key.clone(), 1u32);
/// assert_eq!(cache.get(&key), Some(1));
/// ```
pub struct CacheBuilder<K, V> {
  time_to_live: Option<Duration>,
  segments: usize,
  listeners: Listeners<K, V>,
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("time_to_live", &self.time_to_live)
      .field("segments", &self.segments)
      .field("listeners", &self.listeners)
      .finish()
  }
}

impl<K, V> Default for CacheBuilder<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> CacheBuilder<K, V> {
  pub fn new() -> Self {
    Self {
      time_to_live: None,
      segments: DEFAULT_SEGMENTS,
      listeners: Listeners::default(),
    }
  }

  /// Sets the default time-to-live applied by `insert`, `renew`, and
  /// loader-filled misses. Without one, entries never expire.
  pub fn time_to_live(mut self, duration: Duration) -> Self {
    self.time_to_live = Some(duration);
    self
  }

  /// Sets the number of segments for [`build_segmented`]. The count is
  /// fixed for the cache's lifetime.
  ///
  /// [`build_segmented`]: CacheBuilder::build_segmented
  pub fn segments(mut self, segments: usize) -> Self {
    self.segments = segments;
    self
  }

  /// Attaches hooks fired around loader invocation.
  pub fn create_listener<L>(mut self, listener: L) -> Self
  where
    L: CreateListener<K, V> + 'static,
  {
    self.listeners.create = Some(Arc::new(listener));
    self
  }

  /// Attaches hooks fired around the single-key read paths.
  pub fn read_listener<L>(mut self, listener: L) -> Self
  where
    L: ReadListener<K, V> + 'static,
  {
    self.listeners.read = Some(Arc::new(listener));
    self
  }

  /// Attaches hooks fired around in-place overwrites.
  pub fn update_listener<L>(mut self, listener: L) -> Self
  where
    L: UpdateListener<K, V> + 'static,
  {
    self.listeners.update = Some(Arc::new(listener));
    self
  }

  /// Attaches hooks fired around every removal, with its cause.
  pub fn remove_listener<L>(mut self, listener: L) -> Self
  where
    L: RemoveListener<K, V> + 'static,
  {
    self.listeners.remove = Some(Arc::new(listener));
    self
  }
}

impl<K, V> CacheBuilder<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  fn into_shared(self) -> CacheShared<K, V> {
    CacheShared::new(self.time_to_live, self.listeners)
  }

  /// Builds the unsynchronized weak-keyed cache (`!Sync`).
  pub fn build_weak(self) -> WeakCache<K, V> {
    WeakCache::from_shared(self.into_shared())
  }

  /// Builds the mutex-serialized weak-keyed cache.
  pub fn build_sync_weak(self) -> SyncWeakCache<K, V> {
    SyncWeakCache::from_shared(self.into_shared())
  }

  /// Builds the segmented concurrent cache.
  pub fn build_segmented(self) -> Result<SegmentedCache<K, V>, BuildError> {
    if self.segments == 0 {
      return Err(BuildError::ZeroSegments);
    }
    let segments = self.segments;
    Ok(SegmentedCache::from_shared(self.into_shared(), segments))
  }
}

impl<K, V> CacheBuilder<K, V>
where
  K: Eq + Hash + 'static,
  V: Clone + 'static,
{
  /// Builds the thread-confined cache: one private store per calling
  /// thread, no locking anywhere.
  pub fn build_thread_confined(self) -> ThreadConfinedCache<K, V> {
    ThreadConfinedCache::from_shared(self.into_shared())
  }
}
