//! Capacity-bounded cache for venue resolutions.

use crate::resolve::Resolution;
use moka::sync::Cache;

/// Default number of cached descriptions. One entry per distinct cleaned
/// description, so a batch run stays well under this.
pub const VENUE_CACHE_CAPACITY: u64 = 1024;

/// Cache seam of the resolver. Keys are cleaned description texts.
pub trait VenueCache {
    fn get(&self, key: &str) -> Option<Resolution>;
    fn put(&self, key: &str, value: Resolution);
}

/// Production cache backed by `moka`, evicting least-recently-used entries
/// once the capacity is reached.
pub struct MokaVenueCache {
    inner: Cache<String, Resolution>,
}

impl MokaVenueCache {
    pub fn new() -> Self {
        Self::with_capacity(VENUE_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }
}

impl Default for MokaVenueCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VenueCache for MokaVenueCache {
    fn get(&self, key: &str) -> Option<Resolution> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Resolution) {
        self.inner.insert(key.to_string(), value);
    }
}
