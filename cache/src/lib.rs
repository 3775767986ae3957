//! A weak-keyed, TTL-expiring in-process cache family.
//!
//! # Features
//! - **Weak keys**: keys are held as `Weak<K>`; the caller's `Arc<K>` is
//!   what keeps an entry alive, so dropping the last external reference
//!   makes the entry reclaimable independent of its TTL.
//! - **Lazy expiration**: entries expire against a per-cache default TTL
//!   (or a per-insert override) and are reclaimed on the next touching
//!   access or an explicit `clean_up()`, never by a background timer.
//! - **Four concurrency shapes**: an unsynchronized `!Sync` cache, a
//!   mutex-serialized wrapper, a segmented cache spreading contention
//!   across independently locked shards, and a thread-confined cache that
//!   needs no locking at all.
//! - **Lifecycle listeners**: optional create/read/update/remove hooks
//!   with a closed removal-cause taxonomy.
//! - **Observability**: per-cache metrics with a point-in-time snapshot.

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod listener;
pub mod metrics;

// Internal, crate-only modules
mod cache;
mod confined;
mod entry;
mod segmented;
mod shared;
mod store;
mod time;
mod weak;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use cache::Cache;
pub use confined::ThreadConfinedCache;
pub use error::{BuildError, CacheError};
pub use listener::{
  CreateListener, ReadListener, RemovalCause, RemoveListener, UpdateListener,
};
pub use metrics::MetricsSnapshot;
pub use segmented::{SegmentedCache, DEFAULT_SEGMENTS};
pub use weak::{SyncWeakCache, WeakCache};
