use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for all expiry arithmetic in the crate.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Returns the current time as nanoseconds since the crate epoch.
#[inline]
pub(crate) fn now_nanos() -> u64 {
  Instant::now()
    .saturating_duration_since(*CACHE_EPOCH)
    .as_nanos() as u64
}

/// Converts an optional TTL into an absolute expiry timestamp.
///
/// `None` maps to `0`, the "never expires" sentinel. A zero-duration TTL is
/// bumped to the next nanosecond so it cannot collide with the sentinel.
#[inline]
pub(crate) fn expiry_from_ttl(now: u64, ttl: Option<Duration>) -> u64 {
  match ttl {
    Some(d) => now.saturating_add(d.as_nanos() as u64).max(1),
    None => 0,
  }
}
