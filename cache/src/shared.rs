use crate::error::CacheError;
use crate::listener::{Listeners, RemovalCause};
use crate::metrics::Metrics;
use crate::store::{Purged, WeakStore};
use crate::time;

use std::hash::Hash;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;

/// The store-independent half of every cache in the family: default TTL,
/// listener dispatch, and metrics accounting.
///
/// Each facade owns one `CacheShared` and however many `WeakStore`s its
/// concurrency model calls for (one, one per thread, or one per segment);
/// the core's methods operate on whichever store the facade hands them.
pub(crate) struct CacheShared<K, V> {
  pub(crate) time_to_live: Option<Duration>,
  pub(crate) listeners: Listeners<K, V>,
  pub(crate) metrics: Arc<Metrics>,
}

impl<K, V> CacheShared<K, V>
where
  K: Eq + Hash,
  V: Clone,
{
  pub(crate) fn new(time_to_live: Option<Duration>, listeners: Listeners<K, V>) -> Self {
    Self {
      time_to_live,
      listeners,
      metrics: Arc::new(Metrics::new()),
    }
  }

  /// Fires remove hooks and eviction metrics for slots a store reclaimed.
  ///
  /// The physical removal has already happened by the time records reach
  /// this point; the before/after pair frames the dispatch itself.
  pub(crate) fn dispatch_purged(&self, purged: Vec<Purged<K, V>>) {
    for record in purged {
      match record.cause {
        RemovalCause::Expired => {
          self.metrics.evicted_by_ttl.fetch_add(1, Ordering::Relaxed);
        }
        RemovalCause::Collected => {
          self
            .metrics
            .evicted_by_collection
            .fetch_add(1, Ordering::Relaxed);
        }
        RemovalCause::Explicit => {
          self.metrics.invalidations.fetch_add(1, Ordering::Relaxed);
        }
        RemovalCause::Replaced | RemovalCause::Size => {}
      }
      if let Some(listener) = &self.listeners.remove {
        let key = record.key.as_deref();
        listener.before_remove(key, &record.value, record.cause);
        listener.after_remove(key, &record.value, record.cause);
      }
    }
  }

  /// Pure visibility check. No mutation, no listeners, no metrics.
  pub(crate) fn contains(&self, store: &WeakStore<K, V>, key: &K) -> bool {
    store.peek(key, time::now_nanos()).is_some()
  }

  /// The single-key read path: fires read hooks, counts hit/miss, and
  /// lazily reclaims whatever the probe turned up.
  pub(crate) fn read(&self, store: &mut WeakStore<K, V>, key: &K) -> Option<V> {
    if let Some(listener) = &self.listeners.read {
      listener.before_read(key);
    }

    let mut purged = Vec::new();
    let value = store
      .probe(key, time::now_nanos(), &mut purged)
      .map(|entry| entry.value.clone());
    self.dispatch_purged(purged);

    match value {
      Some(value) => {
        self.metrics.record_hit();
        if let Some(listener) = &self.listeners.read {
          listener.on_hit(key, &value);
        }
        Some(value)
      }
      None => {
        self.metrics.record_miss();
        if let Some(listener) = &self.listeners.read {
          listener.on_miss(key);
        }
        None
      }
    }
  }

  pub(crate) fn try_get(&self, store: &mut WeakStore<K, V>, key: &K) -> Result<V, CacheError> {
    self.read(store, key).ok_or(CacheError::NotFound)
  }

  /// Inserts with the given TTL, mutating a visible entry in place.
  ///
  /// An overwrite fires update hooks framing a `Replaced` remove pair; an
  /// insert over an expired slot first processes the expiry, then inserts
  /// fresh.
  pub(crate) fn insert(
    &self,
    store: &mut WeakStore<K, V>,
    key: &Arc<K>,
    value: V,
    ttl: Option<Duration>,
  ) {
    let now = time::now_nanos();
    let expires_at = time::expiry_from_ttl(now, ttl);

    let mut purged = Vec::new();
    if let Some(entry) = store.probe(key, now, &mut purged) {
      if let Some(listener) = &self.listeners.update {
        listener.before_update(key, &entry.value);
      }
      if let Some(listener) = &self.listeners.remove {
        listener.before_remove(Some(key), &entry.value, RemovalCause::Replaced);
      }

      let old = std::mem::replace(&mut entry.value, value);
      entry.expires_at = expires_at;

      if let Some(listener) = &self.listeners.remove {
        listener.after_remove(Some(key), &old, RemovalCause::Replaced);
      }
      if let Some(listener) = &self.listeners.update {
        listener.after_update(key, &old, &entry.value);
      }
      self.metrics.updates.fetch_add(1, Ordering::Relaxed);
    } else {
      store.insert_fresh(key, value, expires_at);
    }
    self.metrics.inserts.fetch_add(1, Ordering::Relaxed);
    self.dispatch_purged(purged);
  }

  /// Re-stamps the expiry of a visible entry from "now". Absent and
  /// expired keys are left alone: renew never creates an entry.
  pub(crate) fn renew(
    &self,
    store: &mut WeakStore<K, V>,
    key: &K,
    ttl: Option<Duration>,
  ) -> bool {
    let now = time::now_nanos();
    let expires_at = time::expiry_from_ttl(now, ttl);

    let mut purged = Vec::new();
    let renewed = match store.probe(key, now, &mut purged) {
      Some(entry) => {
        entry.expires_at = expires_at;
        true
      }
      None => false,
    };
    self.dispatch_purged(purged);
    renewed
  }

  /// Removes a visible entry with cause `Explicit`, firing the remove
  /// hooks around the removal itself.
  pub(crate) fn invalidate(&self, store: &mut WeakStore<K, V>, key: &K) -> bool {
    let now = time::now_nanos();

    if let Some(listener) = &self.listeners.remove {
      if let Some(value) = store.peek(key, now) {
        listener.before_remove(Some(key), value, RemovalCause::Explicit);
      }
    }

    let mut purged = Vec::new();
    let removed = store.remove(key, now, &mut purged);
    self.dispatch_purged(purged);

    match removed {
      Some(value) => {
        self.metrics.invalidations.fetch_add(1, Ordering::Relaxed);
        if let Some(listener) = &self.listeners.remove {
          listener.after_remove(Some(key), &value, RemovalCause::Explicit);
        }
        true
      }
      None => false,
    }
  }

  pub(crate) fn clear(&self, store: &mut WeakStore<K, V>) {
    let mut purged = Vec::new();
    store.drain(time::now_nanos(), &mut purged);
    self.dispatch_purged(purged);
  }

  pub(crate) fn clean_up(&self, store: &mut WeakStore<K, V>) {
    let mut purged = Vec::new();
    store.sweep(time::now_nanos(), &mut purged);
    self.dispatch_purged(purged);
  }

  /// Batch visibility pass: copies visible values into `found` and pushes
  /// unseen invisible keys onto `missing`, preserving first-occurrence
  /// order. Stored entries are read without side effects.
  pub(crate) fn collect_present(
    &self,
    store: &WeakStore<K, V>,
    keys: &[Arc<K>],
    found: &mut HashMap<Arc<K>, V>,
    missing: Option<&mut Vec<Arc<K>>>,
  ) {
    let now = time::now_nanos();
    let mut missing = missing;
    for key in keys {
      if found.contains_key(key) {
        continue;
      }
      if let Some(list) = missing.as_deref() {
        if list.iter().any(|seen| **seen == **key) {
          continue;
        }
      }
      match store.peek(key, now) {
        Some(value) => {
          self.metrics.record_hit();
          found.insert(key.clone(), value.clone());
        }
        None => {
          self.metrics.record_miss();
          if let Some(list) = missing.as_deref_mut() {
            list.push(key.clone());
          }
        }
      }
    }
  }

  /// Runs the loader for a single missing key, framed by create hooks.
  pub(crate) fn load_one(&self, key: &Arc<K>, loader: &dyn Fn(&Arc<K>) -> V) -> V {
    if let Some(listener) = &self.listeners.create {
      listener.before_create(key);
    }
    let value = loader(key);
    self.metrics.loads.fetch_add(1, Ordering::Relaxed);
    if let Some(listener) = &self.listeners.create {
      listener.after_create(key, &value);
    }
    value
  }

  /// Runs the batch loader for the missing subset, framed by per-key
  /// create hooks.
  pub(crate) fn load_batch(
    &self,
    missing: &[Arc<K>],
    loader: &dyn Fn(&[Arc<K>]) -> HashMap<Arc<K>, V>,
  ) -> HashMap<Arc<K>, V> {
    if let Some(listener) = &self.listeners.create {
      for key in missing {
        listener.before_create(key);
      }
    }
    let loaded = loader(missing);
    self
      .metrics
      .loads
      .fetch_add(missing.len() as u64, Ordering::Relaxed);
    if let Some(listener) = &self.listeners.create {
      for (key, value) in &loaded {
        listener.after_create(key, value);
      }
    }
    loaded
  }
}
