//! Configuration system for the cache simulator.
//!
//! This module defines the configuration structures used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline geometry, latencies and memory size.
//! 2. **Structures:** A root config with `cache` and `memory` sections.
//! 3. **Validation:** Conversion of the cache section into a checked [`Geometry`].
//!
//! Configuration is read from JSON (`Config::from_json`) or built from
//! `Config::default()` and overridden field by field, which is what the CLI does.

use serde::Deserialize;

use crate::cache::Geometry;
use crate::common::ConfigError;

/// Default configuration constants for the simulator.
///
/// These match the configuration the command-line tool falls back to when
/// nothing else is given.
mod defaults {
    /// Default block size (4 words = 16 bytes).
    pub const WORDS_PER_BLOCK: usize = 4;

    /// Default number of cache blocks.
    pub const NR_BLOCKS: usize = 16;

    /// Default associativity (2-way set-associative).
    pub const NR_WAYS: usize = 2;

    /// Cycles charged for an access that hits.
    pub const CYCLES_HIT: u64 = 1;

    /// Cycles charged for an access that misses.
    pub const CYCLES_MISS: u64 = 100;

    /// Size of the backing store (8 KiB).
    pub const MEMORY_SIZE: usize = 8 << 10;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::Config;
///
/// let json = r#"{
///     "cache": { "words_per_block": 8, "nr_blocks": 32, "nr_ways": 4 },
///     "memory": { "size_bytes": 4096 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.nr_ways, 4);
/// assert_eq!(config.cache.cycles_miss, 100);
/// assert!(config.memory.seeded);
/// assert_eq!(config.cache.geometry().unwrap().nr_sets(), 8);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry and latencies
    #[serde(default)]
    pub cache: CacheConfig,
    /// Backing store configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    ///
    /// Missing sections and fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is malformed or a field has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Cache geometry and access cost configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Block size in 4-byte words
    #[serde(default = "CacheConfig::default_words_per_block")]
    pub words_per_block: usize,

    /// Total number of cache blocks
    #[serde(default = "CacheConfig::default_nr_blocks")]
    pub nr_blocks: usize,

    /// Associativity (1 = direct-mapped, `nr_blocks` = fully associative)
    #[serde(default = "CacheConfig::default_nr_ways")]
    pub nr_ways: usize,

    /// Cycles charged per hit
    #[serde(default = "CacheConfig::default_cycles_hit")]
    pub cycles_hit: u64,

    /// Cycles charged per miss
    #[serde(default = "CacheConfig::default_cycles_miss")]
    pub cycles_miss: u64,
}

impl CacheConfig {
    /// Creates a cache configuration with the given geometry and default latencies.
    pub const fn new(words_per_block: usize, nr_blocks: usize, nr_ways: usize) -> Self {
        Self {
            words_per_block,
            nr_blocks,
            nr_ways,
            cycles_hit: defaults::CYCLES_HIT,
            cycles_miss: defaults::CYCLES_MISS,
        }
    }

    /// Validates the geometry fields and resolves them into a [`Geometry`].
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] describing the first invalid field.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(self.words_per_block, self.nr_blocks, self.nr_ways)
    }

    /// Returns the default block size in words.
    const fn default_words_per_block() -> usize {
        defaults::WORDS_PER_BLOCK
    }

    /// Returns the default block count.
    const fn default_nr_blocks() -> usize {
        defaults::NR_BLOCKS
    }

    /// Returns the default associativity.
    const fn default_nr_ways() -> usize {
        defaults::NR_WAYS
    }

    /// Returns the default hit cost in cycles.
    const fn default_cycles_hit() -> u64 {
        defaults::CYCLES_HIT
    }

    /// Returns the default miss cost in cycles.
    const fn default_cycles_miss() -> u64 {
        defaults::CYCLES_MISS
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(
            defaults::WORDS_PER_BLOCK,
            defaults::NR_BLOCKS,
            defaults::NR_WAYS,
        )
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Memory size in bytes
    #[serde(default = "MemoryConfig::default_size")]
    pub size_bytes: usize,

    /// Pre-load the known byte pattern at address 0
    #[serde(default = "MemoryConfig::default_seeded")]
    pub seeded: bool,
}

impl MemoryConfig {
    /// Returns the default memory size in bytes.
    const fn default_size() -> usize {
        defaults::MEMORY_SIZE
    }

    /// Memory is seeded unless explicitly disabled.
    const fn default_seeded() -> bool {
        true
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::MEMORY_SIZE,
            seeded: true,
        }
    }
}
