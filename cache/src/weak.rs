use crate::cache::Cache;
use crate::error::CacheError;
use crate::metrics::MetricsSnapshot;
use crate::shared::CacheShared;
use crate::store::WeakStore;

use core::fmt;
use std::cell::RefCell;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;
use parking_lot::Mutex;

/// The unsynchronized weak-keyed cache.
///
/// Backed by a single [`WeakStore`] behind a `RefCell`, which makes the
/// type `!Sync`: sharing it across threads is a compile error, so the
/// "unsynchronized variant, cross-thread use requires the synchronized
/// wrapper" contract is a type-level fact. Use [`SyncWeakCache`] (or
/// [`CacheBuilder::build_sync_weak`]) when the cache must be shared.
///
/// [`CacheBuilder::build_sync_weak`]: crate::CacheBuilder::build_sync_weak
pub struct WeakCache<K, V> {
  store: RefCell<WeakStore<K, V>>,
  shared: CacheShared<K, V>,
}

impl<K, V> fmt::Debug for WeakCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakCache")
      .field("time_to_live", &self.shared.time_to_live)
      .finish_non_exhaustive()
  }
}

impl<K, V> WeakCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub(crate) fn from_shared(shared: CacheShared<K, V>) -> Self {
    Self {
      store: RefCell::new(WeakStore::new()),
      shared,
    }
  }
}

impl<K, V> Cache<K, V> for WeakCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  fn contains(&self, key: &K) -> bool {
    self.shared.contains(&self.store.borrow(), key)
  }

  fn get(&self, key: &K) -> Option<V> {
    self.shared.read(&mut self.store.borrow_mut(), key)
  }

  fn try_get(&self, key: &K) -> Result<V, CacheError> {
    self.shared.try_get(&mut self.store.borrow_mut(), key)
  }

  fn get_with(&self, key: &Arc<K>, loader: &dyn Fn(&Arc<K>) -> V) -> V {
    if let Some(value) = self.shared.read(&mut self.store.borrow_mut(), key) {
      return value;
    }

    // The store borrow is released here, so the loader may reenter the
    // cache. Concurrent misses are not deduplicated; last insert wins.
    let value = self.shared.load_one(key, loader);
    self.shared.insert(
      &mut self.store.borrow_mut(),
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
    self
      .shared
      .collect_present(&self.store.borrow(), keys, &mut found, Some(&mut missing));

    if missing.is_empty() {
      return found;
    }

    let loaded = self.shared.load_batch(&missing, batch_loader);
    let mut store = self.store.borrow_mut();
    for (key, value) in loaded {
      self
        .shared
        .insert(&mut store, &key, value.clone(), self.shared.time_to_live);
      found.insert(key, value);
    }
    found
  }

  fn get_present(&self, keys: &[Arc<K>]) -> HashMap<Arc<K>, V> {
    let mut found = HashMap::default();
    self
      .shared
      .collect_present(&self.store.borrow(), keys, &mut found, None);
    found
  }

  fn insert(&self, key: Arc<K>, value: V) {
    self.shared.insert(
      &mut self.store.borrow_mut(),
      &key,
      value,
      self.shared.time_to_live,
    );
  }

  fn insert_with_ttl(&self, key: Arc<K>, value: V, ttl: Duration) {
    self
      .shared
      .insert(&mut self.store.borrow_mut(), &key, value, Some(ttl));
  }

  fn renew(&self, key: &K) -> bool {
    self
      .shared
      .renew(&mut self.store.borrow_mut(), key, self.shared.time_to_live)
  }

  fn renew_with_ttl(&self, key: &K, ttl: Duration) -> bool {
    self
      .shared
      .renew(&mut self.store.borrow_mut(), key, Some(ttl))
  }

  fn invalidate(&self, key: &K) -> bool {
    self.shared.invalidate(&mut self.store.borrow_mut(), key)
  }

  fn clear(&self) {
    self.shared.clear(&mut self.store.borrow_mut());
  }

  fn clean_up(&self) {
    self.shared.clean_up(&mut self.store.borrow_mut());
  }

  fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}

/// The synchronized weak-keyed cache: every operation is serialized behind
/// one mutex, making the cache shareable across threads.
///
/// The mutex is *not* held across loader invocation: only the store
/// bookkeeping on either side of the load is serialized, so a slow loader
/// does not stall unrelated readers for its whole duration.
pub struct SyncWeakCache<K, V> {
  store: Mutex<WeakStore<K, V>>,
  shared: CacheShared<K, V>,
}

impl<K, V> fmt::Debug for SyncWeakCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SyncWeakCache")
      .field("time_to_live", &self.shared.time_to_live)
      .finish_non_exhaustive()
  }
}

impl<K, V> SyncWeakCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub(crate) fn from_shared(shared: CacheShared<K, V>) -> Self {
    Self {
      store: Mutex::new(WeakStore::new()),
      shared,
    }
  }
}

impl<K, V> Cache<K, V> for SyncWeakCache<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  fn contains(&self, key: &K) -> bool {
    self.shared.contains(&self.store.lock(), key)
  }

  fn get(&self, key: &K) -> Option<V> {
    self.shared.read(&mut self.store.lock(), key)
  }

  fn try_get(&self, key: &K) -> Result<V, CacheError> {
    self.shared.try_get(&mut self.store.lock(), key)
  }

  fn get_with(&self, key: &Arc<K>, loader: &dyn Fn(&Arc<K>) -> V) -> V {
    if let Some(value) = self.shared.read(&mut self.store.lock(), key) {
      return value;
    }

    // Lock released; user code runs unlocked. Concurrent misses on the
    // same key may each invoke the loader; the last insert wins.
    let value = self.shared.load_one(key, loader);
    self.shared.insert(
      &mut self.store.lock(),
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
    self
      .shared
      .collect_present(&self.store.lock(), keys, &mut found, Some(&mut missing));

    if missing.is_empty() {
      return found;
    }

    let loaded = self.shared.load_batch(&missing, batch_loader);
    let mut store = self.store.lock();
    for (key, value) in loaded {
      self
        .shared
        .insert(&mut store, &key, value.clone(), self.shared.time_to_live);
      found.insert(key, value);
    }
    found
  }

  fn get_present(&self, keys: &[Arc<K>]) -> HashMap<Arc<K>, V> {
    let mut found = HashMap::default();
    self
      .shared
      .collect_present(&self.store.lock(), keys, &mut found, None);
    found
  }

  fn insert(&self, key: Arc<K>, value: V) {
    self
      .shared
      .insert(&mut self.store.lock(), &key, value, self.shared.time_to_live);
  }

  fn insert_with_ttl(&self, key: Arc<K>, value: V, ttl: Duration) {
    self
      .shared
      .insert(&mut self.store.lock(), &key, value, Some(ttl));
  }

  fn renew(&self, key: &K) -> bool {
    self
      .shared
      .renew(&mut self.store.lock(), key, self.shared.time_to_live)
  }

  fn renew_with_ttl(&self, key: &K, ttl: Duration) -> bool {
    self.shared.renew(&mut self.store.lock(), key, Some(ttl))
  }

  fn invalidate(&self, key: &K) -> bool {
    self.shared.invalidate(&mut self.store.lock(), key)
  }

  fn clear(&self) {
    self.shared.clear(&mut self.store.lock());
  }

  fn clean_up(&self) {
    self.shared.clean_up(&mut self.store.lock());
  }

  fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}
