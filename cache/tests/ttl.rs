mod common;

use common::key;

use burrow_cache::{Cache, CacheBuilder, CacheError};
use std::{thread, time::Duration};

const TINY_TTL: Duration = Duration::from_millis(300);
const SLEEP_MARGIN: Duration = Duration::from_millis(300);

#[test]
fn test_entry_expires_after_ttl() {
  let cache = CacheBuilder::new().time_to_live(TINY_TTL).build_sync_weak();

  let k = key("alpha");
  cache.insert(k.clone(), "one".to_string());
  assert!(cache.contains(&k));

  thread::sleep(TINY_TTL + SLEEP_MARGIN);

  assert!(!cache.contains(&k), "entry should have expired");
  assert_eq!(cache.try_get(&k), Err(CacheError::NotFound));

  let metrics = cache.metrics();
  assert_eq!(metrics.evicted_by_ttl, 1, "the touching read reclaims the slot");
  assert_eq!(metrics.hits, 0);
  assert_eq!(metrics.misses, 1);
}

#[test]
fn test_per_insert_ttl_overrides_default() {
  let cache = CacheBuilder::new()
    .time_to_live(Duration::from_secs(3600))
    .build_sync_weak();

  let k = key("alpha");
  cache.insert_with_ttl(k.clone(), "one".to_string(), TINY_TTL);

  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert_eq!(cache.get(&k), None);
}

#[test]
fn test_ttl_is_not_reset_on_access() {
  let cache = CacheBuilder::new().time_to_live(TINY_TTL).build_sync_weak();

  let k = key("alpha");
  cache.insert(k.clone(), "one".to_string());

  thread::sleep(TINY_TTL / 2);
  assert!(cache.get(&k).is_some());
  thread::sleep(TINY_TTL / 2 + SLEEP_MARGIN);
  assert!(
    cache.get(&k).is_none(),
    "entry should have expired despite the mid-life access"
  );
}

#[test]
fn test_renew_restamps_the_expiry() {
  let cache = CacheBuilder::new().time_to_live(TINY_TTL).build_sync_weak();

  let k = key("alpha");
  cache.insert(k.clone(), "one".to_string());

  thread::sleep(TINY_TTL / 2);
  assert!(cache.renew(&k));
  thread::sleep(TINY_TTL / 2 + Duration::from_millis(50));

  // Without the renew this read would land past the original deadline.
  assert_eq!(cache.get(&k), Some("one".to_string()));

  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert_eq!(cache.get(&k), None, "renewed TTL still runs out");
}

#[test]
fn test_renew_ignores_expired_entries() {
  let cache = CacheBuilder::new().time_to_live(TINY_TTL).build_sync_weak();

  let k = key("alpha");
  cache.insert(k.clone(), "one".to_string());
  thread::sleep(TINY_TTL + SLEEP_MARGIN);

  assert!(!cache.renew(&k), "renew must not resurrect an expired entry");
  assert!(!cache.contains(&k));
}

#[test]
fn test_renew_with_ttl_extends_a_never_expiring_entry() {
  let cache = CacheBuilder::new().build_sync_weak();

  let k = key("alpha");
  cache.insert(k.clone(), "one".to_string());

  assert!(cache.renew_with_ttl(&k, TINY_TTL));
  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  assert_eq!(cache.get(&k), None);
}

#[test]
fn test_clean_up_sweeps_expired_entries() {
  let cache = CacheBuilder::new().time_to_live(TINY_TTL).build_sync_weak();

  let keys: Vec<_> = ["a", "b", "c"].iter().map(|n| key(n)).collect();
  for k in &keys {
    cache.insert(k.clone(), "v".to_string());
  }
  let keeper = key("keeper");
  cache.insert_with_ttl(keeper.clone(), "v".to_string(), Duration::from_secs(3600));

  thread::sleep(TINY_TTL + SLEEP_MARGIN);
  cache.clean_up();

  let metrics = cache.metrics();
  assert_eq!(metrics.evicted_by_ttl, 3);
  assert!(cache.contains(&keeper), "unexpired entries survive the sweep");
}

#[test]
fn test_insert_over_expired_entry_is_fresh_not_update() {
  let cache = CacheBuilder::new().time_to_live(TINY_TTL).build_sync_weak();

  let k = key("alpha");
  cache.insert(k.clone(), "one".to_string());
  thread::sleep(TINY_TTL + SLEEP_MARGIN);

  cache.insert(k.clone(), "two".to_string());

  let metrics = cache.metrics();
  assert_eq!(metrics.updates, 0, "expired entries are not updated in place");
  assert_eq!(metrics.evicted_by_ttl, 1);
  assert_eq!(cache.get(&k), Some("two".to_string()));
}
