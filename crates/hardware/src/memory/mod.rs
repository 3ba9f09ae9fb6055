//! Backing Store.
//!
//! Flat byte-addressable main memory behind the cache. The cache reads whole
//! blocks from it on a fill and writes whole blocks back on eviction; nothing
//! else writes to it during a simulation.
//!
//! Accesses are bounds-checked with assertions: an out-of-range address is a
//! caller bug, not a recoverable condition. The command layer validates
//! addresses before they reach the cache.

use std::fmt;

use serde::Serialize;

use crate::common::BYTES_PER_WORD;
use crate::common::constants::{DUMP_ROW_BYTES, DUMP_WINDOW_BYTES, WORD_ALIGN_MASK};
use crate::config::MemoryConfig;

/// Initial contents of the first bytes of a seeded memory.
pub const SEED: [u8; 80] = [
    0xde, 0xad, 0xbe, 0xef, 0xba, 0xda, 0xca, 0xfe, //
    0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, //
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
    0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, //
    b'h', b'e', b'l', b'l', b'o', b' ', b'w', b'o', //
    b'r', b'l', b'd', b'!', 0x89, 0xab, 0xcd, 0xef, //
    0x50, 0x52, 0x54, 0x56, 0x58, 0x5a, 0x5c, 0x5e, //
    0x60, 0x62, 0x64, 0x66, 0x68, 0x6a, 0x6c, 0x6e, //
    0x70, 0x72, 0x74, 0x76, 0x78, 0x7a, 0x7c, 0x7e, //
    0x80, 0x82, 0x84, 0x86, 0x88, 0x8a, 0x8c, 0x8e, //
];

/// Main memory: a zero-initialized byte array.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Creates a zeroed memory of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Creates a memory of `size` bytes starting with [`SEED`].
    ///
    /// If `size` is smaller than the seed, the seed is truncated.
    pub fn seeded(size: usize) -> Self {
        let mut mem = Self::new(size);
        let len = SEED.len().min(size);
        mem.bytes[..len].copy_from_slice(&SEED[..len]);
        mem
    }

    /// Creates a memory as described by `config`.
    pub fn from_config(config: &MemoryConfig) -> Self {
        if config.seeded {
            Self::seeded(config.size_bytes)
        } else {
            Self::new(config.size_bytes)
        }
    }

    /// Returns the size of the memory in bytes.
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-sized memory.
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns true if `len` bytes starting at `addr` lie inside memory.
    pub fn contains(&self, addr: u32, len: usize) -> bool {
        (addr as usize)
            .checked_add(len)
            .is_some_and(|end| end <= self.bytes.len())
    }

    /// The whole memory as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads a single byte.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside memory.
    pub fn read_u8(&self, offset: usize) -> u8 {
        assert!(offset < self.bytes.len(), "memory read out of bounds");
        self.bytes[offset]
    }

    /// Writes a single byte.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside memory.
    pub fn write_u8(&mut self, offset: usize, val: u8) {
        assert!(offset < self.bytes.len(), "memory write out of bounds");
        self.bytes[offset] = val;
    }

    /// Reads the big-endian word at `offset`, bypassing any cache.
    ///
    /// # Panics
    ///
    /// Panics if the word does not lie wholly inside memory.
    pub fn read_word(&self, offset: usize) -> u32 {
        let bytes = self.read_slice(offset, BYTES_PER_WORD);
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Writes `val` big-endian at `offset`, bypassing any cache.
    ///
    /// # Panics
    ///
    /// Panics if the word does not lie wholly inside memory.
    pub fn write_word(&mut self, offset: usize, val: u32) {
        self.write_slice(offset, &val.to_be_bytes());
    }

    /// Reads a slice of memory.
    ///
    /// # Panics
    ///
    /// Panics if `offset..offset + len` is outside memory.
    pub fn read_slice(&self, offset: usize, len: usize) -> &[u8] {
        assert!(
            offset + len <= self.bytes.len(),
            "memory read out of bounds"
        );
        &self.bytes[offset..offset + len]
    }

    /// Writes a slice of memory.
    ///
    /// # Panics
    ///
    /// Panics if `data` does not fit in memory at `offset`.
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) {
        assert!(
            offset + data.len() <= self.bytes.len(),
            "memory write out of bounds"
        );
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Returns the dump window starting at `start`, rounded down to a word.
    ///
    /// The window is [`DUMP_WINDOW_BYTES`] long, or shorter near the end of memory.
    pub fn window(&self, start: u32) -> MemoryWindow {
        let start = start & WORD_ALIGN_MASK;
        let from = (start as usize).min(self.bytes.len());
        let to = (from + DUMP_WINDOW_BYTES).min(self.bytes.len());
        MemoryWindow {
            start,
            bytes: self.bytes[from..to].to_vec(),
        }
    }

    /// Returns the aligned dump windows whose bytes differ from `before`.
    ///
    /// Both memories are compared up to the shorter of the two.
    pub fn changed_windows<'a>(
        &'a self,
        before: &'a Self,
    ) -> impl Iterator<Item = MemoryWindow> + 'a {
        self.bytes
            .chunks(DUMP_WINDOW_BYTES)
            .zip(before.bytes.chunks(DUMP_WINDOW_BYTES))
            .enumerate()
            .filter(|(_, (now, then))| now != then)
            .map(|(i, (now, _))| MemoryWindow {
                start: (i * DUMP_WINDOW_BYTES) as u32,
                bytes: now.to_vec(),
            })
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// A window of raw memory bytes, as printed by `dump`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryWindow {
    /// Address of the first byte.
    pub start: u32,
    /// Bytes of the window.
    pub bytes: Vec<u8>,
}

impl MemoryWindow {
    /// Big-endian word at byte `offset` into the window, if present.
    pub fn word(&self, offset: usize) -> Option<u32> {
        let bytes = self.bytes.get(offset..offset + BYTES_PER_WORD)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl fmt::Display for MemoryWindow {
    /// Prints sixteen bytes per row, each row prefixed with its address.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            let addr = self.start as usize + i;
            if addr % DUMP_ROW_BYTES == 0 {
                write!(f, "[0x{addr:08x}] ")?;
            }
            write!(f, "{byte:02x}")?;
            if (addr + 1) % BYTES_PER_WORD == 0 {
                f.write_str(" ")?;
            }
            if (addr + 1) % DUMP_ROW_BYTES == 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
