//! Set-Associative Cache Simulator.
//!
//! This module implements a configurable set-associative cache with LRU
//! replacement in front of a flat backing store. It models:
//! 1. **Lookup:** Hit/miss detection within the set an address maps to.
//! 2. **Replacement:** Victim selection (matching tag, then empty slot, then LRU).
//! 3. **Data paths:** Word loads and stores with write-back, write-allocate semantics.
//!
//! Block metadata and block data live in two contiguous arenas indexed by
//! `set * nr_ways + way`; nothing is allocated per block.

/// Cache snapshots for diagnostics.
pub mod dump;
/// Geometry resolution and address decomposition.
pub mod geometry;
/// Cache replacement policy implementations.
pub mod policies;

pub use dump::{BlockSnapshot, CacheDump, SetSnapshot};
pub use geometry::{AddrParts, Geometry};

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, info, trace};

use self::policies::{LruPolicy, ReplacementPolicy};
use crate::common::BYTES_PER_WORD;
use crate::memory::Memory;

/// Metadata of one cache block.
///
/// `tag` is meaningful only while `valid` is set, and `dirty` implies `valid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheBlock {
    /// The block holds a copy of a memory block.
    pub valid: bool,
    /// The block differs from memory and must be written back before reuse.
    pub dirty: bool,
    /// Which memory block mapping to this set is resident.
    pub tag: u32,
    /// Logical clock value of the last access, for LRU ordering.
    pub timestamp: u64,
}

/// Outcome of a cache access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    /// The block was resident.
    Hit,
    /// The block was not resident and has been filled from memory.
    Miss {
        /// The set held no valid block at all.
        cold: bool,
        /// A dirty victim was written back to memory before the fill.
        wrote_back: bool,
    },
}

impl Access {
    /// True for [`Access::Hit`].
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }

    /// True for [`Access::Miss`].
    pub const fn is_miss(self) -> bool {
        !self.is_hit()
    }
}

/// Cache simulator implementing a write-back, write-allocate set-associative cache.
///
/// The cache never owns memory; every operation that may fill or evict a block
/// borrows the backing store for its duration.
#[derive(Debug)]
pub struct CacheSim {
    geometry: Geometry,
    blocks: Vec<CacheBlock>,
    data: Vec<u8>,
    policy: Box<dyn ReplacementPolicy>,
    clock: u64,
}

impl CacheSim {
    /// Creates an empty LRU cache with the given geometry.
    ///
    /// All blocks start invalid, clean and zeroed.
    pub fn new(geometry: Geometry) -> Self {
        Self::with_policy(geometry, Box::new(LruPolicy))
    }

    /// Creates an empty cache that evicts from full sets using `policy`.
    pub fn with_policy(geometry: Geometry, policy: Box<dyn ReplacementPolicy>) -> Self {
        info!(
            words_per_block = geometry.words_per_block(),
            blocks = geometry.nr_blocks(),
            ways = geometry.nr_ways(),
            sets = geometry.nr_sets(),
            policy = policy.name(),
            "cache initialized"
        );
        Self {
            blocks: vec![CacheBlock::default(); geometry.nr_blocks()],
            data: vec![0; geometry.nr_blocks() * geometry.block_bytes()],
            geometry,
            policy,
            clock: 0,
        }
    }

    /// The cache geometry.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Current logical clock; advances once per completed load or store.
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Name of the replacement policy used for full sets.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// All block records, set by set.
    pub fn blocks(&self) -> &[CacheBlock] {
        &self.blocks
    }

    /// The blocks of one set, indexed by way.
    ///
    /// # Panics
    ///
    /// Panics if `set_index >= nr_sets`.
    pub fn set(&self, set_index: usize) -> &[CacheBlock] {
        let base = set_index * self.geometry.nr_ways();
        &self.blocks[base..base + self.geometry.nr_ways()]
    }

    /// Metadata of the block at `(set_index, way)`.
    pub fn block(&self, set_index: usize, way: usize) -> &CacheBlock {
        &self.blocks[self.index(set_index, way)]
    }

    /// Raw contents of the block at `(set_index, way)`.
    pub fn block_data(&self, set_index: usize, way: usize) -> &[u8] {
        &self.data[self.data_range(self.index(set_index, way))]
    }

    /// Number of blocks currently holding unwritten data.
    pub fn dirty_blocks(&self) -> usize {
        self.blocks.iter().filter(|block| block.dirty).count()
    }

    /// True if the block containing `addr` is resident. Has no side effects.
    pub fn contains(&self, addr: u32) -> bool {
        self.find_way(&self.geometry.decompose(addr)).is_some()
    }

    /// Returns the cached word at `addr` if its block is resident, without
    /// touching recency or counters.
    pub fn peek_word(&self, addr: u32) -> Option<u32> {
        let parts = self.geometry.decompose(addr);
        let way = self.find_way(&parts)?;
        let idx = self.index(parts.set_index, way);
        Some(self.read_word(idx, parts.word_offset))
    }

    /// Looks `addr` up in its set.
    ///
    /// A hit refreshes the matching block's timestamp, exactly as a real access
    /// would. A miss changes nothing.
    pub fn probe(&mut self, addr: u32) -> Access {
        let parts = self.geometry.decompose(addr);
        if self.lookup(&parts).is_some() {
            Access::Hit
        } else {
            Access::Miss {
                cold: self.set_is_empty(parts.set_index),
                wrote_back: false,
            }
        }
    }

    /// Chooses the way in `addr`'s set that will receive `addr`'s block.
    ///
    /// In order of priority: the only way of a direct-mapped set; a valid block
    /// already holding the tag; the first invalid block; the policy's victim.
    /// The chosen block's timestamp is refreshed. Nothing is written back here.
    pub fn select_victim(&mut self, addr: u32) -> usize {
        let parts = self.geometry.decompose(addr);
        self.choose_victim(&parts)
    }

    /// Loads the word at `addr`, filling its block on a miss.
    ///
    /// # Returns
    ///
    /// The hit/miss outcome and the big-endian word read from the cache.
    pub fn load_word(&mut self, mem: &mut Memory, addr: u32) -> (Access, u32) {
        let parts = self.geometry.decompose(addr);
        let (access, way) = self.resolve(mem, &parts);
        let value = self.read_word(self.index(parts.set_index, way), parts.word_offset);
        self.clock += 1;
        (access, value)
    }

    /// Stores `value` at `addr` (write-back, write-allocate).
    ///
    /// On a miss the whole block is fetched before the word is replaced. Memory is
    /// not updated until the block is evicted or flushed.
    pub fn store_word(&mut self, mem: &mut Memory, addr: u32, value: u32) -> Access {
        let parts = self.geometry.decompose(addr);
        let (access, way) = self.resolve(mem, &parts);
        let idx = self.index(parts.set_index, way);
        self.write_word(idx, parts.word_offset, value);
        let block = &mut self.blocks[idx];
        block.dirty = true;
        block.timestamp = self.clock;
        self.clock += 1;
        access
    }

    /// Writes every dirty block back to memory and marks it clean.
    ///
    /// Blocks stay valid. Returns the number of blocks written back.
    pub fn flush(&mut self, mem: &mut Memory) -> usize {
        let ways = self.geometry.nr_ways();
        let mut written = 0;
        for idx in 0..self.blocks.len() {
            if self.write_back(mem, idx / ways, idx % ways) {
                written += 1;
            }
        }
        info!(written, "flushed dirty blocks");
        written
    }

    /// Snapshot of every block, grouped by set.
    pub fn dump(&self) -> CacheDump {
        let ways = self.geometry.nr_ways();
        let sets = (0..self.geometry.nr_sets())
            .map(|set_index| SetSnapshot {
                index: set_index,
                blocks: (0..ways)
                    .map(|way| {
                        let idx = self.index(set_index, way);
                        let block = self.blocks[idx];
                        BlockSnapshot {
                            index: idx,
                            way,
                            valid: block.valid,
                            dirty: block.dirty,
                            tag: block.tag,
                            timestamp: block.timestamp,
                            data: self.data[self.data_range(idx)].to_vec(),
                        }
                    })
                    .collect(),
            })
            .collect();
        CacheDump {
            geometry: self.geometry,
            sets,
        }
    }

    const fn index(&self, set_index: usize, way: usize) -> usize {
        set_index * self.geometry.nr_ways() + way
    }

    const fn data_range(&self, idx: usize) -> Range<usize> {
        let start = idx * self.geometry.block_bytes();
        start..start + self.geometry.block_bytes()
    }

    fn set_is_empty(&self, set_index: usize) -> bool {
        self.set(set_index).iter().all(|block| !block.valid)
    }

    /// The one residency test shared by lookup and replacement.
    fn find_way(&self, parts: &AddrParts) -> Option<usize> {
        self.set(parts.set_index)
            .iter()
            .position(|block| block.valid && block.tag == parts.tag)
    }

    fn lookup(&mut self, parts: &AddrParts) -> Option<usize> {
        let way = self.find_way(parts)?;
        let idx = self.index(parts.set_index, way);
        self.blocks[idx].timestamp = self.clock;
        Some(way)
    }

    fn choose_victim(&mut self, parts: &AddrParts) -> usize {
        let way = if self.geometry.is_direct_mapped() {
            0
        } else if let Some(way) = self.find_way(parts) {
            way
        } else if let Some(way) = self
            .set(parts.set_index)
            .iter()
            .position(|block| !block.valid)
        {
            way
        } else {
            self.policy.victim(self.set(parts.set_index))
        };
        let idx = self.index(parts.set_index, way);
        self.blocks[idx].timestamp = self.clock;
        way
    }

    /// Finds or allocates the block for `parts`, evicting and filling on a miss.
    fn resolve(&mut self, mem: &mut Memory, parts: &AddrParts) -> (Access, usize) {
        if let Some(way) = self.lookup(parts) {
            trace!(set = parts.set_index, way, tag = parts.tag, "hit");
            return (Access::Hit, way);
        }

        let cold = self.set_is_empty(parts.set_index);
        let way = self.choose_victim(parts);
        let wrote_back = self.write_back(mem, parts.set_index, way);
        self.fill(mem, parts, way);
        debug!(
            set = parts.set_index,
            way,
            tag = parts.tag,
            cold,
            wrote_back,
            "miss"
        );
        (Access::Miss { cold, wrote_back }, way)
    }

    /// Copies a dirty block to the address rebuilt from its current tag.
    fn write_back(&mut self, mem: &mut Memory, set_index: usize, way: usize) -> bool {
        let idx = self.index(set_index, way);
        let block = self.blocks[idx];
        if !block.dirty {
            return false;
        }
        let base = self.geometry.block_base(block.tag, set_index) as usize;
        let range = self.data_range(idx);
        mem.write_slice(base, &self.data[range]);
        self.blocks[idx].dirty = false;
        debug!(
            set = set_index,
            way,
            tag = block.tag,
            addr = base,
            "write-back"
        );
        true
    }

    fn fill(&mut self, mem: &Memory, parts: &AddrParts, way: usize) {
        let idx = self.index(parts.set_index, way);
        let block_bytes = self.geometry.block_bytes();
        let base = parts.block_address as usize * block_bytes;
        let range = self.data_range(idx);
        self.data[range].copy_from_slice(mem.read_slice(base, block_bytes));
        self.blocks[idx] = CacheBlock {
            valid: true,
            dirty: false,
            tag: parts.tag,
            timestamp: self.clock,
        };
    }

    fn read_word(&self, idx: usize, word_offset: usize) -> u32 {
        let start = idx * self.geometry.block_bytes() + word_offset * BYTES_PER_WORD;
        let bytes = &self.data[start..start + BYTES_PER_WORD];
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn write_word(&mut self, idx: usize, word_offset: usize, value: u32) {
        let start = idx * self.geometry.block_bytes() + word_offset * BYTES_PER_WORD;
        self.data[start..start + BYTES_PER_WORD].copy_from_slice(&value.to_be_bytes());
    }
}
