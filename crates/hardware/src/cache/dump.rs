//! Cache snapshots.
//!
//! A [`CacheDump`] captures validity, dirtiness, tag, timestamp and raw bytes of
//! every block. Its `Display` output is one line per block, word-grouped hex, with
//! a blank line after each set when the cache has more than one way:
//!
//! ```text
//! [  0] vd        0        3 | cafebabe 00000000 00000000 00000000
//! ```

use std::fmt;

use serde::Serialize;

use super::Geometry;
use crate::common::BYTES_PER_WORD;

/// One block of a [`CacheDump`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSnapshot {
    /// Position in the block table.
    pub index: usize,
    /// Way within the set.
    pub way: usize,
    /// Valid bit.
    pub valid: bool,
    /// Dirty bit.
    pub dirty: bool,
    /// Tag of the resident block.
    pub tag: u32,
    /// Logical time of the last access.
    pub timestamp: u64,
    /// Block contents.
    pub data: Vec<u8>,
}

/// One set of a [`CacheDump`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSnapshot {
    /// Set index.
    pub index: usize,
    /// Blocks of the set, by way.
    pub blocks: Vec<BlockSnapshot>,
}

/// Snapshot of the whole block table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheDump {
    /// Geometry of the dumped cache.
    pub geometry: Geometry,
    /// All sets, in index order.
    pub sets: Vec<SetSnapshot>,
}

impl CacheDump {
    /// All blocks in table order.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockSnapshot> {
        self.sets.iter().flat_map(|set| set.blocks.iter())
    }
}

impl fmt::Display for BlockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:3}] {}{} {:8x} {:8} | ",
            self.index,
            if self.valid { 'v' } else { ' ' },
            if self.dirty { 'd' } else { ' ' },
            self.tag,
            self.timestamp
        )?;
        for (i, byte) in self.data.iter().enumerate() {
            write!(f, "{byte:02x}")?;
            if (i + 1) % BYTES_PER_WORD == 0 {
                f.write_str(" ")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CacheDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grouped = self.geometry.nr_ways() > 1;
        for set in &self.sets {
            for block in &set.blocks {
                writeln!(f, "{block}")?;
            }
            if grouped {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
