use crate::cache::Cache;
use crate::error::CacheError;
use crate::metrics::MetricsSnapshot;
use crate::shared::CacheShared;
use crate::store::WeakStore;

use core::fmt;
use std::any::Any;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;

// Instance ids are process-global so that every thread's registry maps the
// same cache to the same slot.
static NEXT_CONFINED_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
  // One registry per thread: instance id -> that thread's private store.
  // `Rc<dyn Any>` because caches of different K/V share the registry; the
  // id fixes the concrete type on the other side of the downcast.
  static CONFINED_STORES: RefCell<HashMap<u64, Rc<dyn Any>>> =
    RefCell::new(HashMap::default());
}

/// A cache whose entries are confined to the thread that wrote them.
///
/// Each calling thread lazily materializes its own private [`WeakStore`]
/// on first use, so no locking is performed anywhere on the read or write
/// path: every thread exclusively owns its own store. The semantics are
/// otherwise identical to the other caches in the family, with the
/// consequence that an entry inserted on one thread is invisible on every
/// other, and each thread's miss runs its own loader.
///
/// `clear` and `clean_up` act on the calling thread's store only. Metrics
/// counters are shared across all threads of the instance.
///
/// Dropping the cache releases the current thread's store immediately;
/// stores materialized by other threads are released when those threads
/// exit.
pub struct ThreadConfinedCache<K, V> {
  id: u64,
  shared: CacheShared<K, V>,
}

impl<K, V> fmt::Debug for ThreadConfinedCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ThreadConfinedCache")
      .field("id", &self.id)
      .field("time_to_live", &self.shared.time_to_live)
      .finish_non_exhaustive()
  }
}

impl<K, V> ThreadConfinedCache<K, V>
where
  K: Eq + Hash + 'static,
  V: Clone + 'static,
{
  pub(crate) fn from_shared(shared: CacheShared<K, V>) -> Self {
    Self {
      id: NEXT_CONFINED_ID.fetch_add(1, Ordering::Relaxed),
      shared,
    }
  }

  /// Runs `f` against the calling thread's store, materializing it on
  /// first use.
  ///
  /// The registry borrow is released before `f` runs, so `f` may touch
  /// other thread-confined caches; reentering *this* cache from inside
  /// `f` is not allowed.
  fn with_store<R>(&self, f: impl FnOnce(&mut WeakStore<K, V>) -> R) -> R {
    CONFINED_STORES.with(|registry| {
      let store = {
        let mut map = registry.borrow_mut();
        let slot = map
          .entry(self.id)
          .or_insert_with(|| Rc::new(RefCell::new(WeakStore::<K, V>::new())) as Rc<dyn Any>);
        match slot.clone().downcast::<RefCell<WeakStore<K, V>>>() {
          Ok(store) => store,
          // The id is globally unique and always paired with one K/V.
          Err(_) => unreachable!("confined store registered under a foreign id"),
        }
      };
      let mut store = store.borrow_mut();
      f(&mut store)
    })
  }
}

impl<K, V> Drop for ThreadConfinedCache<K, V> {
  fn drop(&mut self) {
    // Best effort: TLS may already be torn down during thread exit.
    let _ = CONFINED_STORES.try_with(|registry| {
      registry.borrow_mut().remove(&self.id);
    });
  }
}

impl<K, V> Cache<K, V> for ThreadConfinedCache<K, V>
where
  K: Eq + Hash + 'static,
  V: Clone + 'static,
{
  fn contains(&self, key: &K) -> bool {
    self.with_store(|store| self.shared.contains(store, key))
  }

  fn get(&self, key: &K) -> Option<V> {
    self.with_store(|store| self.shared.read(store, key))
  }

  fn try_get(&self, key: &K) -> Result<V, CacheError> {
    self.with_store(|store| self.shared.try_get(store, key))
  }

  fn get_with(&self, key: &Arc<K>, loader: &dyn Fn(&Arc<K>) -> V) -> V {
    if let Some(value) = self.with_store(|store| self.shared.read(store, key)) {
      return value;
    }

    // The store borrow is released here; the loader may reenter the cache.
    let value = self.shared.load_one(key, loader);
    self.with_store(|store| {
      self
        .shared
        .insert(store, key, value.clone(), self.shared.time_to_live)
    });
    value
  }

  fn get_all(
    &self,
    keys: &[Arc<K>],
    batch_loader: &dyn Fn(&[Arc<K>]) -> HashMap<Arc<K>, V>,
  ) -> HashMap<Arc<K>, V> {
    let mut found = HashMap::default();
    let mut missing = Vec::new();
    self.with_store(|store| {
      self
        .shared
        .collect_present(store, keys, &mut found, Some(&mut missing))
    });

    if missing.is_empty() {
      return found;
    }

    let loaded = self.shared.load_batch(&missing, batch_loader);
    self.with_store(|store| {
      for (key, value) in loaded {
        self
          .shared
          .insert(store, &key, value.clone(), self.shared.time_to_live);
        found.insert(key, value);
      }
    });
    found
  }

  fn get_present(&self, keys: &[Arc<K>]) -> HashMap<Arc<K>, V> {
    let mut found = HashMap::default();
    self.with_store(|store| {
      self.shared.collect_present(store, keys, &mut found, None);
    });
    found
  }

  fn insert(&self, key: Arc<K>, value: V) {
    self.with_store(|store| {
      self
        .shared
        .insert(store, &key, value, self.shared.time_to_live)
    });
  }

  fn insert_with_ttl(&self, key: Arc<K>, value: V, ttl: Duration) {
    self.with_store(|store| self.shared.insert(store, &key, value, Some(ttl)));
  }

  fn renew(&self, key: &K) -> bool {
    self.with_store(|store| self.shared.renew(store, key, self.shared.time_to_live))
  }

  fn renew_with_ttl(&self, key: &K, ttl: Duration) -> bool {
    self.with_store(|store| self.shared.renew(store, key, Some(ttl)))
  }

  fn invalidate(&self, key: &K) -> bool {
    self.with_store(|store| self.shared.invalidate(store, key))
  }

  fn clear(&self) {
    self.with_store(|store| self.shared.clear(store));
  }

  fn clean_up(&self) {
    self.with_store(|store| self.shared.clean_up(store));
  }

  fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }
}
