//! Cache Replacement Policies.
//!
//! A policy only decides among the blocks of a set that is full of valid blocks.
//! The cache itself handles the cases that come first: a one-way set, a block
//! that already holds the requested tag, and an invalid block waiting to be filled.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used, by per-block timestamp.

/// Least Recently Used replacement policy.
pub mod lru;

pub use lru::LruPolicy;

use std::fmt;

use super::CacheBlock;

/// Trait for cache replacement policies.
///
/// Recency lives in each block's `timestamp`, so policies read the set instead of
/// keeping their own per-set state.
pub trait ReplacementPolicy: fmt::Debug {
    /// Short name of the policy, used in logs.
    fn name(&self) -> &'static str;

    /// Selects the way to evict from a set of valid blocks.
    ///
    /// # Arguments
    ///
    /// * `set` - The blocks of one set, indexed by way. Never empty.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn victim(&self, set: &[CacheBlock]) -> usize;
}
