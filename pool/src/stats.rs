/// A point-in-time snapshot of a pool's counters.
///
/// Counters are maintained under the pool's own synchronization, so a
/// snapshot is internally consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
  /// Factory invocations (core and excess construction combined).
  pub created: u64,
  /// Leases served from an idle ring instead of the factory.
  pub reused: u64,
  /// Excess slots dropped by the keep-alive sweep.
  pub idle_evicted: u64,
  /// Excess slots discarded at release because retention was full.
  pub discarded: u64,
  /// Currently leased nodes.
  pub outstanding: u64,
}
