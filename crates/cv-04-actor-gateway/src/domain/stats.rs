//! Cache counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of gateway counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStats {
    /// Handles built (status round trip included).
    pub constructions: u64,
    /// Requests served from the cache.
    pub cache_hits: u64,
    /// Handles dropped from the cache.
    pub evictions: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    constructions: AtomicU64,
    cache_hits: AtomicU64,
    evictions: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn constructed(&self) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn evicted(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> GatewayStats {
        GatewayStats {
            constructions: self.constructions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
