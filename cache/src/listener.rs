use std::fmt;
use std::sync::Arc;

/// Describes why an entry left the cache.
///
/// The set is closed: every removal a cache performs is classified as
/// exactly one of these causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
  /// The entry was removed by an explicit `invalidate` or `clear`.
  Explicit,
  /// The entry was overwritten by an `insert` while still visible.
  Replaced,
  /// The last external strong reference to the weak key was dropped and
  /// the slot was reclaimed.
  Collected,
  /// The entry's time-to-live passed.
  Expired,
  /// The slot was dropped by capacity or idle-timeout accounting.
  Size,
}

impl RemovalCause {
  /// Whether the removal was initiated by the cache rather than the caller.
  ///
  /// `Explicit` and `Replaced` are caller actions; everything else is an
  /// eviction.
  #[inline]
  pub fn is_eviction(&self) -> bool {
    !matches!(self, RemovalCause::Explicit | RemovalCause::Replaced)
  }
}

impl fmt::Display for RemovalCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemovalCause::Explicit => write!(f, "explicitly removed"),
      RemovalCause::Replaced => write!(f, "replaced by insert"),
      RemovalCause::Collected => write!(f, "weak key reclaimed"),
      RemovalCause::Expired => write!(f, "expired (TTL)"),
      RemovalCause::Size => write!(f, "evicted by size or idle timeout"),
    }
  }
}

/// Hooks fired around loader invocation when a miss is being filled.
pub trait CreateListener<K, V>: Send + Sync {
  fn before_create(&self, _key: &K) {}
  fn after_create(&self, _key: &K, _value: &V) {}
}

/// Hooks fired around the single-key read paths (`try_get`, `get`,
/// `get_with`). Batch reads and `contains` do not fire these.
pub trait ReadListener<K, V>: Send + Sync {
  fn before_read(&self, _key: &K) {}
  fn on_hit(&self, _key: &K, _value: &V) {}
  fn on_miss(&self, _key: &K) {}
}

/// Hooks fired around an `insert` that overwrites a visible entry.
pub trait UpdateListener<K, V>: Send + Sync {
  fn before_update(&self, _key: &K, _old: &V) {}
  fn after_update(&self, _key: &K, _old: &V, _new: &V) {}
}

/// Hooks fired around any removal, with its [`RemovalCause`].
///
/// `key` is `None` exactly when the cause is [`RemovalCause::Collected`]:
/// the weak key has already been reclaimed and no strong reference can be
/// recovered for the callback.
pub trait RemoveListener<K, V>: Send + Sync {
  fn before_remove(&self, _key: Option<&K>, _value: &V, _cause: RemovalCause) {}
  fn after_remove(&self, _key: Option<&K>, _value: &V, _cause: RemovalCause) {}
}

/// The set of listeners attached to one cache instance.
///
/// Every category is optional and defaults to absent. Listeners are invoked
/// synchronously by the operation that triggered them, under the store or
/// segment lock where one exists, so they should be fast and must not
/// reenter the cache.
pub(crate) struct Listeners<K, V> {
  pub(crate) create: Option<Arc<dyn CreateListener<K, V>>>,
  pub(crate) read: Option<Arc<dyn ReadListener<K, V>>>,
  pub(crate) update: Option<Arc<dyn UpdateListener<K, V>>>,
  pub(crate) remove: Option<Arc<dyn RemoveListener<K, V>>>,
}

impl<K, V> Default for Listeners<K, V> {
  fn default() -> Self {
    Self {
      create: None,
      read: None,
      update: None,
      remove: None,
    }
  }
}

impl<K, V> Clone for Listeners<K, V> {
  fn clone(&self) -> Self {
    Self {
      create: self.create.clone(),
      read: self.read.clone(),
      update: self.update.clone(),
      remove: self.remove.clone(),
    }
  }
}

impl<K, V> fmt::Debug for Listeners<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Listeners")
      .field("create", &self.create.is_some())
      .field("read", &self.read.is_some())
      .field("update", &self.update.is_some())
      .field("remove", &self.remove.is_some())
      .finish()
  }
}
