use crate::error::CacheError;
use crate::metrics::MetricsSnapshot;

use std::sync::Arc;
use std::time::Duration;

use ahash::HashMap;

/// The operation surface shared by every cache in the family.
///
/// Keys are handed to the cache as `Arc<K>`: the cache holds them only
/// weakly, and the caller's `Arc` is what keeps an entry's key, and with
/// it the entry, alive. Once the last external strong reference to a key
/// is dropped, its entry becomes unreachable and the slot is reclaimed on
/// a later access or [`clean_up`](Cache::clean_up).
///
/// Values are returned by clone; callers caching expensive-to-clone data
/// typically choose an `Arc<T>` value type.
///
/// The trait is object-safe, so consumers can hold a `Box<dyn Cache<K, V>>`
/// and stay agnostic of the concrete variant they were handed.
pub trait Cache<K, V> {
  /// Returns `true` iff a visible entry exists for `key`.
  ///
  /// Purely observational: no entry is reclaimed, no listener fires, no
  /// metric moves.
  fn contains(&self, key: &K) -> bool;

  /// Returns the visible value for `key`, or `None` if the key is absent,
  /// reclaimed, or expired.
  ///
  /// This is a touching read: an expired or dead slot found under the key
  /// is removed on the way through.
  fn get(&self, key: &K) -> Option<V>;

  /// Like [`get`](Cache::get), but failing with [`CacheError::NotFound`]
  /// instead of returning `None`.
  fn try_get(&self, key: &K) -> Result<V, CacheError>;

  /// Returns the cached value for `key`, invoking `loader` to fill a miss.
  ///
  /// The loaded value is stored with the cache's default TTL and returned.
  /// The loader runs with no store lock or borrow held, so it may itself
  /// use the cache.
  ///
  /// There is no single-flight guarantee: concurrent misses on the same
  /// key may each invoke the loader, and the last insert wins. A panic in
  /// the loader propagates to the caller; nothing is stored and nothing is
  /// retried.
  fn get_with(&self, key: &Arc<K>, loader: &dyn Fn(&Arc<K>) -> V) -> V;

  /// Batch [`get_with`](Cache::get_with): returns one entry per requested
  /// key, invoking `batch_loader` once with exactly the subset of keys that
  /// is not currently visible (in first-occurrence order, duplicates
  /// removed).
  ///
  /// Visible entries are read without side effects. Loaded values are
  /// stored with the default TTL. Keys the batch loader declines to
  /// produce are omitted from the result; a panic in the batch loader
  /// propagates and fails the whole batch.
  fn get_all(
    &self,
    keys: &[Arc<K>],
    batch_loader: &dyn Fn(&[Arc<K>]) -> HashMap<Arc<K>, V>,
  ) -> HashMap<Arc<K>, V>;

  /// Returns the subset of `keys` that is currently visible.
  ///
  /// Never invokes a loader; absent, reclaimed, and expired keys are
  /// silently omitted; stored entries are read without side effects.
  fn get_present(&self, keys: &[Arc<K>]) -> HashMap<Arc<K>, V>;

  /// Inserts `value` under `key` with the cache's default TTL.
  ///
  /// Overwriting a visible entry mutates it in place, firing the update
  /// hooks around a `Replaced` removal pair.
  fn insert(&self, key: Arc<K>, value: V);

  /// Inserts with an explicit TTL, overriding the cache default.
  fn insert_with_ttl(&self, key: Arc<K>, value: V, ttl: Duration);

  /// Re-stamps the expiry of a visible entry from "now" using the cache's
  /// default TTL. Returns `false`, and creates nothing, if the key is
  /// absent, reclaimed, or already expired.
  fn renew(&self, key: &K) -> bool;

  /// [`renew`](Cache::renew) with an explicit TTL.
  fn renew_with_ttl(&self, key: &K, ttl: Duration) -> bool;

  /// Removes the visible entry for `key`, returning whether one existed.
  ///
  /// A present-but-expired entry is reclaimed as `Expired` and `false` is
  /// returned.
  fn invalidate(&self, key: &K) -> bool;

  /// Removes every entry.
  ///
  /// On the segmented cache this clears one segment at a time: a
  /// concurrent writer may repopulate an already-cleared segment before a
  /// later one is reached. Best-effort, not a transaction.
  fn clear(&self);

  /// Proactively reclaims every expired and dead-key slot.
  ///
  /// Expiry is otherwise lazy. There is no background timer in this
  /// design, so long-idle caches hold expired slots until the next touch
  /// or an explicit `clean_up`.
  fn clean_up(&self);

  /// A point-in-time snapshot of this cache's metrics.
  fn metrics(&self) -> MetricsSnapshot;
}
