//! Simulator: owns the cache, the backing store and the counters side by side.
//!
//! The cache borrows memory only for the duration of an access, so there is no
//! shared ownership and no global state; dropping the simulator ends the run.

use tracing::info;

use crate::cache::{Access, CacheDump, CacheSim, Geometry};
use crate::common::ConfigError;
use crate::config::{CacheConfig, Config};
use crate::memory::{Memory, MemoryWindow};
use crate::stats::{AccessKind, CacheStats};

/// Top-level simulator: cache + memory + statistics.
#[derive(Debug)]
pub struct Simulator {
    config: CacheConfig,
    cache: CacheSim,
    memory: Memory,
    stats: CacheStats,
}

impl Simulator {
    /// Creates a simulator from a full configuration.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`with_memory`](Self::with_memory).
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::with_memory(&config.cache, Memory::from_config(&config.memory))
    }

    /// Creates a simulator over an existing backing store.
    ///
    /// # Errors
    ///
    /// Fails if the cache geometry is invalid, memory is not a whole number of
    /// blocks, or the cache holds more bytes than memory.
    pub fn with_memory(config: &CacheConfig, memory: Memory) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        let block_bytes = geometry.block_bytes();
        if memory.is_empty() || memory.len() % block_bytes != 0 {
            return Err(ConfigError::MemorySize {
                size: memory.len(),
                block_bytes,
            });
        }
        if geometry.capacity_bytes() > memory.len() {
            return Err(ConfigError::CacheTooLarge {
                capacity: geometry.capacity_bytes(),
                size: memory.len(),
            });
        }
        info!(
            memory = memory.len(),
            cycles_hit = config.cycles_hit,
            cycles_miss = config.cycles_miss,
            "simulator ready"
        );
        Ok(Self {
            config: *config,
            cache: CacheSim::new(geometry),
            memory,
            stats: CacheStats::default(),
        })
    }

    /// Loads the word at `addr` through the cache.
    ///
    /// # Panics
    ///
    /// Panics if `addr` lies outside memory.
    pub fn load(&mut self, addr: u32) -> (Access, u32) {
        let (access, value) = self.cache.load_word(&mut self.memory, addr);
        self.record(AccessKind::Load, access);
        (access, value)
    }

    /// Stores `value` at `addr` through the cache.
    ///
    /// # Panics
    ///
    /// Panics if `addr` lies outside memory.
    pub fn store(&mut self, addr: u32, value: u32) -> Access {
        let access = self.cache.store_word(&mut self.memory, addr, value);
        self.record(AccessKind::Store, access);
        access
    }

    /// Writes all dirty blocks back to memory. Returns how many were written.
    pub fn flush(&mut self) -> usize {
        let written = self.cache.flush(&mut self.memory);
        self.stats.record_flush(written);
        written
    }

    /// Ends the run: flushes the cache and hands back memory and statistics.
    pub fn finish(mut self) -> (Memory, CacheStats) {
        let _ = self.flush();
        (self.memory, self.stats)
    }

    /// Snapshot of every cache block.
    pub fn dump_cache(&self) -> CacheDump {
        self.cache.dump()
    }

    /// Raw memory window at `start` (rounded down to a word), bypassing the cache.
    pub fn dump_memory(&self, start: u32) -> MemoryWindow {
        self.memory.window(start)
    }

    /// Statistics so far.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The cache.
    pub const fn cache(&self) -> &CacheSim {
        &self.cache
    }

    /// The backing store, as seen without the cache.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Cache geometry.
    pub const fn geometry(&self) -> &Geometry {
        self.cache.geometry()
    }

    /// Cache configuration, including per-access costs.
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn record(&mut self, kind: AccessKind, access: Access) {
        let cycles = if access.is_hit() {
            self.config.cycles_hit
        } else {
            self.config.cycles_miss
        };
        self.stats.record(kind, access, cycles);
    }
}
