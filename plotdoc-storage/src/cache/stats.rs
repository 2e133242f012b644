//! Cache usage counters.

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of reads answered from a present entry.
    pub hits: u64,
    /// Number of reads that found no usable entry.
    pub misses: u64,
    /// Number of entries moved from present to stale.
    pub invalidations: u64,
    /// Number of entries currently present.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
