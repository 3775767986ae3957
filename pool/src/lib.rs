//! A bounded object pool with a permanently retained core allotment and a
//! time-limited excess overflow.
//!
//! # Features
//! - **Core/excess sizing**: up to `core_size` slots are constructed
//!   lazily and retained forever; demand beyond that is served by
//!   "excess" slots subject to idle-timeout eviction.
//! - **FIFO reuse**: idle slots are leased oldest release first, so every
//!   retained slot keeps circulating instead of a hot few.
//! - **RAII leases**: [`PoolNode`] returns its slot on drop;
//!   [`PoolNode::release`] spells the hand-back out where that reads
//!   better.
//! - **Never blocks**: `get` always returns, constructing a new slot when
//!   the rings are exhausted. `max_size` caps what the pool *retains*,
//!   not what it will lease out.
//! - **Two concurrency shapes**: the `!Sync` [`SimplePool`] for
//!   single-threaded use and the mutex-serialized [`SyncPool`] for
//!   sharing.

mod node;
mod pool;
mod stats;
mod sync;

pub use node::PoolNode;
pub use pool::SimplePool;
pub use stats::PoolStats;
pub use sync::SyncPool;
