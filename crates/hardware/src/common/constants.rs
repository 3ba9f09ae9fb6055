//! Global Simulator Constants.
//!
//! The simulated machine is a 32-bit machine with 4-byte words. Words are packed
//! big-endian: the most significant byte sits at the lowest address.

/// Size of a machine word in bytes.
pub const BYTES_PER_WORD: usize = 4;

/// Largest supported block size, in words.
pub const MAX_WORDS_PER_BLOCK: usize = 32;

/// Largest supported number of cache blocks.
pub const MAX_BLOCKS: usize = 1 << 16;

/// Width of a simulated byte address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Number of bytes shown by a memory dump.
pub const DUMP_WINDOW_BYTES: usize = 64;

/// Number of bytes printed per memory dump row.
pub const DUMP_ROW_BYTES: usize = 16;

/// Mask clearing the byte-within-word bits of an address.
pub const WORD_ALIGN_MASK: u32 = !(BYTES_PER_WORD as u32 - 1);
