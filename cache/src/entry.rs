/// A container for a value in the cache, holding its expiry metadata.
///
/// Entries are owned exclusively by one store and are only touched while
/// that store is exclusively borrowed or locked, so the fields are plain
/// values mutated in place by `insert` and `renew`.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  /// The user's value.
  pub(crate) value: V,
  /// The expiration timestamp in nanoseconds since the crate epoch.
  /// 0 means the entry never expires.
  pub(crate) expires_at: u64,
}

impl<V> CacheEntry<V> {
  pub(crate) fn new(value: V, expires_at: u64) -> Self {
    Self { value, expires_at }
  }

  /// Checks whether the entry has outlived its TTL.
  #[inline]
  pub(crate) fn is_expired(&self, now: u64) -> bool {
    self.expires_at != 0 && self.expires_at < now
  }
}
