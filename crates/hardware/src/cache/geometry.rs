//! Cache Geometry Resolver.
//!
//! Turns `(words_per_block, nr_blocks, nr_ways)` into a set count and provides the
//! address decomposition used by every other part of the cache:
//!
//! ```text
//! block_address = addr / (4 * words_per_block)
//! word_offset   = (addr / 4) % words_per_block
//! set_index     = block_address % nr_sets
//! tag           = block_address / nr_sets
//! ```
//!
//! Block sizes and set counts need not be powers of two; all arithmetic is done
//! with division and remainder rather than bit slicing.

use serde::Serialize;

use crate::common::{BYTES_PER_WORD, ConfigError, MAX_BLOCKS, MAX_WORDS_PER_BLOCK};

/// Validated cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    words_per_block: usize,
    nr_blocks: usize,
    nr_ways: usize,
    nr_sets: usize,
}

/// The fields of a byte address as seen by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrParts {
    /// Address divided by the block size.
    pub block_address: u32,
    /// Index of the addressed word within its block.
    pub word_offset: usize,
    /// Set the block maps to.
    pub set_index: usize,
    /// Identifies the block among all blocks mapping to the same set.
    pub tag: u32,
}

impl Geometry {
    /// Resolves and validates a cache geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any parameter is zero, the block size exceeds
    /// [`MAX_WORDS_PER_BLOCK`], the block count exceeds [`MAX_BLOCKS`], or
    /// `nr_ways` does not evenly divide `nr_blocks`.
    pub const fn new(
        words_per_block: usize,
        nr_blocks: usize,
        nr_ways: usize,
    ) -> Result<Self, ConfigError> {
        if words_per_block == 0 || words_per_block > MAX_WORDS_PER_BLOCK {
            return Err(ConfigError::WordsPerBlock {
                words: words_per_block,
                max: MAX_WORDS_PER_BLOCK,
            });
        }
        if nr_blocks == 0 {
            return Err(ConfigError::ZeroBlocks);
        }
        if nr_blocks > MAX_BLOCKS {
            return Err(ConfigError::TooManyBlocks {
                blocks: nr_blocks,
                max: MAX_BLOCKS,
            });
        }
        if nr_ways == 0 {
            return Err(ConfigError::ZeroWays);
        }
        if nr_blocks % nr_ways != 0 {
            return Err(ConfigError::UnevenSets {
                blocks: nr_blocks,
                ways: nr_ways,
            });
        }
        Ok(Self {
            words_per_block,
            nr_blocks,
            nr_ways,
            nr_sets: nr_blocks / nr_ways,
        })
    }

    /// Block size in words.
    pub const fn words_per_block(&self) -> usize {
        self.words_per_block
    }

    /// Total number of blocks.
    pub const fn nr_blocks(&self) -> usize {
        self.nr_blocks
    }

    /// Blocks per set.
    pub const fn nr_ways(&self) -> usize {
        self.nr_ways
    }

    /// Number of sets.
    pub const fn nr_sets(&self) -> usize {
        self.nr_sets
    }

    /// Block size in bytes.
    pub const fn block_bytes(&self) -> usize {
        BYTES_PER_WORD * self.words_per_block
    }

    /// Data capacity of the whole cache in bytes.
    pub const fn capacity_bytes(&self) -> usize {
        self.nr_blocks * self.block_bytes()
    }

    /// True for a one-way cache.
    pub const fn is_direct_mapped(&self) -> bool {
        self.nr_ways == 1
    }

    /// True when the whole cache is a single set.
    pub const fn is_fully_associative(&self) -> bool {
        self.nr_ways == self.nr_blocks
    }

    /// Splits a byte address into block address, word offset, set index and tag.
    pub const fn decompose(&self, addr: u32) -> AddrParts {
        let block_address = addr / self.block_bytes() as u32;
        AddrParts {
            block_address,
            word_offset: (addr as usize / BYTES_PER_WORD) % self.words_per_block,
            set_index: block_address as usize % self.nr_sets,
            tag: block_address / self.nr_sets as u32,
        }
    }

    /// Base byte address of the block identified by `tag` in set `set_index`.
    ///
    /// This is the inverse of [`decompose`](Self::decompose) and is what a dirty
    /// block is written back to.
    pub const fn block_base(&self, tag: u32, set_index: usize) -> u32 {
        ((tag as usize * self.nr_sets + set_index) * self.block_bytes()) as u32
    }

    /// Number of address bits selecting a byte within a block.
    pub const fn offset_bits(&self) -> u32 {
        log2_floor(self.block_bytes())
    }

    /// Number of address bits selecting the set.
    pub const fn index_bits(&self) -> u32 {
        log2_floor(self.nr_sets)
    }

    /// Number of address bits left for the tag in an `address_bits`-wide address.
    pub const fn tag_bits(&self, address_bits: u32) -> u32 {
        address_bits.saturating_sub(self.offset_bits() + self.index_bits())
    }
}

/// Integer part of `log2(n)`; zero for `n <= 1`.
pub const fn log2_floor(n: usize) -> u32 {
    if n <= 1 { 0 } else { n.ilog2() }
}
