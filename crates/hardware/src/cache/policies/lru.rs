//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the block whose last access is oldest. Every access stamps
//! the block with the cache's logical clock, so the victim is simply the block
//! with the smallest timestamp.
//!
//! # Performance
//!
//! - **Time Complexity:** `victim()` is O(W) where W is the number of ways
//! - **Space Complexity:** O(1); the timestamps are part of the block table
//! - **Best Case:** Working sets that fit in a set, with good temporal locality
//! - **Worst Case:** Cyclic scans one block larger than the set (every access misses)

use super::ReplacementPolicy;
use crate::cache::CacheBlock;

/// LRU policy. Stateless; recency is read from block timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruPolicy;

impl ReplacementPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "LRU"
    }

    /// Returns the way with the smallest timestamp. Ties go to the lowest way.
    fn victim(&self, set: &[CacheBlock]) -> usize {
        set.iter()
            .enumerate()
            .min_by_key(|(_, block)| block.timestamp)
            .map_or(0, |(way, _)| way)
    }
}
