mod weak;

pub(crate) use weak::{hash_key, Purged, WeakStore};
