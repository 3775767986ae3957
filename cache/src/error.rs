use std::fmt;

/// Errors returned by cache lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
  /// The key is absent, its key was reclaimed, or its entry expired.
  /// Raised only by [`Cache::try_get`](crate::Cache::try_get); every other
  /// read path reports absence through its return type.
  NotFound,
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::NotFound => write!(f, "key not found or expired"),
    }
  }
}

impl std::error::Error for CacheError {}

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The segmented cache was configured with zero segments, which is not
  /// allowed. The segment count is fixed at construction time.
  ZeroSegments,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroSegments => write!(f, "segment count cannot be zero"),
    }
  }
}

impl std::error::Error for BuildError {}
