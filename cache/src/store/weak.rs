use crate::entry::CacheEntry;
use crate::listener::RemovalCause;

use core::fmt;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::{Arc, Weak};

/// A helper function to hash a key using a `BuildHasher`.
#[inline]
pub(crate) fn hash_key<K: Hash + ?Sized, H: BuildHasher>(hasher: &H, key: &K) -> u64 {
  let mut state = hasher.build_hasher();
  key.hash(&mut state);
  state.finish()
}

/// One weakly held key plus its entry.
struct Slot<K, V> {
  key: Weak<K>,
  entry: CacheEntry<V>,
}

/// A record of a slot the store dropped, carried out for listener dispatch
/// and metrics accounting by the owning cache.
///
/// `key` is `None` when the weak key was already reclaimed; no strong
/// reference can be recovered for a `Collected` slot.
pub(crate) struct Purged<K, V> {
  pub(crate) key: Option<Arc<K>>,
  pub(crate) value: V,
  pub(crate) cause: RemovalCause,
}

/// A weak-keyed, TTL-expiring map.
///
/// The store does not keep keys alive: it holds `Weak<K>` and relies on the
/// caller's `Arc<K>` for liveness. A slot whose key has died is invisible to
/// every lookup and is physically reclaimed the next time its bucket is
/// walked by a mutating operation, or by [`sweep`](WeakStore::sweep).
///
/// Slots live in collision buckets keyed by the key's hash, because a dead
/// `Weak<K>` can no longer be hashed or compared. Each store owns its slots
/// exclusively; callers provide whatever exterior synchronization they need.
pub(crate) struct WeakStore<K, V> {
  buckets: HashMap<u64, Vec<Slot<K, V>>, ahash::RandomState>,
  hasher: ahash::RandomState,
}

impl<K, V> fmt::Debug for WeakStore<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakStore")
      .field("buckets", &self.buckets.len())
      .finish()
  }
}

impl<K, V> Default for WeakStore<K, V>
where
  K: Eq + Hash,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> WeakStore<K, V>
where
  K: Eq + Hash,
{
  pub(crate) fn new() -> Self {
    Self {
      buckets: HashMap::default(),
      hasher: ahash::RandomState::new(),
    }
  }

  /// Looks up the visible entry for `key` without any side effect.
  ///
  /// Dead and expired slots are skipped but left in place; this is the
  /// read path for `contains` and the batch operations.
  pub(crate) fn peek(&self, key: &K, now: u64) -> Option<&V> {
    let hash = hash_key(&self.hasher, key);
    let bucket = self.buckets.get(&hash)?;
    bucket.iter().find_map(|slot| {
      let live = slot.key.upgrade()?;
      (*live == *key && !slot.entry.is_expired(now)).then(|| &slot.entry.value)
    })
  }

  /// Touching lookup: walks the key's bucket, reclaiming dead slots
  /// (`Collected`) and the key's own slot if it expired (`Expired`), and
  /// returns the visible entry if one remains.
  ///
  /// Reclaimed slots are appended to `purged` for the caller to dispatch.
  pub(crate) fn probe(
    &mut self,
    key: &K,
    now: u64,
    purged: &mut Vec<Purged<K, V>>,
  ) -> Option<&mut CacheEntry<V>> {
    let hash = hash_key(&self.hasher, key);

    let mut found = false;
    match self.buckets.get_mut(&hash) {
      None => return None,
      Some(bucket) => {
        let mut i = 0;
        while i < bucket.len() {
          match bucket[i].key.upgrade() {
            None => {
              let slot = bucket.swap_remove(i);
              purged.push(Purged {
                key: None,
                value: slot.entry.value,
                cause: RemovalCause::Collected,
              });
            }
            Some(live) => {
              if *live == *key && bucket[i].entry.is_expired(now) {
                let slot = bucket.swap_remove(i);
                purged.push(Purged {
                  key: Some(live),
                  value: slot.entry.value,
                  cause: RemovalCause::Expired,
                });
              } else {
                if *live == *key {
                  found = true;
                }
                i += 1;
              }
            }
          }
        }
        if bucket.is_empty() {
          self.buckets.remove(&hash);
          return None;
        }
      }
    }

    if !found {
      return None;
    }

    // The bucket now contains only live slots; re-find the match.
    self.buckets.get_mut(&hash)?.iter_mut().find_map(|slot| {
      let live = slot.key.upgrade()?;
      (*live == *key).then(move || &mut slot.entry)
    })
  }

  /// Inserts a fresh slot for a key known not to be visibly present.
  ///
  /// The caller is expected to have run [`probe`](WeakStore::probe) first;
  /// overwrites of visible entries are in-place mutations of the probed
  /// entry, never a second slot.
  pub(crate) fn insert_fresh(&mut self, key: &Arc<K>, value: V, expires_at: u64) {
    let hash = hash_key(&self.hasher, key.as_ref());
    self.buckets.entry(hash).or_default().push(Slot {
      key: Arc::downgrade(key),
      entry: CacheEntry::new(value, expires_at),
    });
  }

  /// Removes the visible entry for `key`, returning its value.
  ///
  /// Expired and dead slots encountered on the way are reclaimed into
  /// `purged` with their own causes; a present-but-expired key therefore
  /// yields `None` here and an `Expired` record there.
  pub(crate) fn remove(
    &mut self,
    key: &K,
    now: u64,
    purged: &mut Vec<Purged<K, V>>,
  ) -> Option<V> {
    if self.probe(key, now, purged).is_none() {
      return None;
    }

    let hash = hash_key(&self.hasher, key);
    let bucket = self.buckets.get_mut(&hash)?;
    let idx = bucket
      .iter()
      .position(|slot| slot.key.upgrade().map_or(false, |live| *live == *key))?;
    let slot = bucket.swap_remove(idx);
    if bucket.is_empty() {
      self.buckets.remove(&hash);
    }
    Some(slot.entry.value)
  }

  /// Reclaims every dead and expired slot in the store.
  pub(crate) fn sweep(&mut self, now: u64, purged: &mut Vec<Purged<K, V>>) {
    self.buckets.retain(|_, bucket| {
      let mut i = 0;
      while i < bucket.len() {
        match bucket[i].key.upgrade() {
          None => {
            let slot = bucket.swap_remove(i);
            purged.push(Purged {
              key: None,
              value: slot.entry.value,
              cause: RemovalCause::Collected,
            });
          }
          Some(live) => {
            if bucket[i].entry.is_expired(now) {
              let slot = bucket.swap_remove(i);
              purged.push(Purged {
                key: Some(live),
                value: slot.entry.value,
                cause: RemovalCause::Expired,
              });
            } else {
              i += 1;
            }
          }
        }
      }
      !bucket.is_empty()
    });
  }

  /// Empties the store, classifying each slot by its true state at the
  /// time of the drain: visible slots are `Explicit` removals, expired
  /// slots `Expired`, dead slots `Collected`.
  pub(crate) fn drain(&mut self, now: u64, purged: &mut Vec<Purged<K, V>>) {
    for (_, bucket) in self.buckets.drain() {
      for slot in bucket {
        let record = match slot.key.upgrade() {
          None => Purged {
            key: None,
            value: slot.entry.value,
            cause: RemovalCause::Collected,
          },
          Some(live) => {
            let cause = if slot.entry.is_expired(now) {
              RemovalCause::Expired
            } else {
              RemovalCause::Explicit
            };
            Purged {
              key: Some(live),
              value: slot.entry.value,
              cause,
            }
          }
        };
        purged.push(record);
      }
    }
  }
}
