//! Error definitions.
//!
//! Cache misses are not errors; they are an ordinary outcome reported through
//! [`Access`](crate::cache::Access). The types here cover the two failure
//! surfaces of the simulator:
//! 1. **Configuration:** Geometry or memory parameters that cannot describe a cache.
//!    These are fatal at startup.
//! 2. **Commands:** Malformed or out-of-range script commands. Most of these are
//!    reported and skipped; I/O failures abort the run.

use thiserror::Error;

/// A cache or memory configuration that cannot be simulated.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Associativity of zero.
    #[error("number of ways must be at least 1")]
    ZeroWays,

    /// A cache without blocks.
    #[error("number of blocks must be at least 1")]
    ZeroBlocks,

    /// Block size outside `1..=max` words.
    #[error("words per block must be between 1 and {max}, got {words}")]
    WordsPerBlock {
        /// Requested words per block.
        words: usize,
        /// Largest supported value.
        max: usize,
    },

    /// More blocks than a cache may allocate.
    #[error("number of blocks must be at most {max}, got {blocks}")]
    TooManyBlocks {
        /// Requested block count.
        blocks: usize,
        /// Largest supported value.
        max: usize,
    },

    /// Ways that do not split the blocks into whole sets.
    #[error("{ways} ways do not evenly divide {blocks} blocks")]
    UnevenSets {
        /// Requested block count.
        blocks: usize,
        /// Requested associativity.
        ways: usize,
    },

    /// Backing store that is empty or not a whole number of blocks.
    #[error("memory size {size} is not a positive multiple of {block_bytes}")]
    MemorySize {
        /// Requested memory size in bytes.
        size: usize,
        /// Cache block size in bytes.
        block_bytes: usize,
    },

    /// Cache holding more bytes than the memory behind it.
    #[error("cache of {capacity} bytes does not fit in {size} bytes of memory")]
    CacheTooLarge {
        /// Cache data capacity in bytes.
        capacity: usize,
        /// Backing store size in bytes.
        size: usize,
    },

    /// Malformed JSON configuration.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A command that could not be executed.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Wrong number of arguments; the message mirrors the interactive usage text.
    #[error("Wrong input for {command}\nUsage: {usage}")]
    Usage {
        /// Command mnemonic.
        command: &'static str,
        /// Usage line for the command.
        usage: &'static str,
    },

    /// Token that is not an integer literal.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    /// Address outside the backing store.
    #[error("address {addr:#010x} is outside the {size}-byte memory")]
    AddressOutOfRange {
        /// Offending address.
        addr: u32,
        /// Backing store size in bytes.
        size: usize,
    },

    /// Input ended before words per block, blocks and ways were read.
    #[error("input ended before words per block, blocks and ways were read")]
    MissingGeometry,

    /// The geometry read from the input is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure serializing a dump.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reading commands or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    /// Returns true when command processing cannot continue after this error.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Json(_) | Self::Config(_) | Self::MissingGeometry
        )
    }
}
