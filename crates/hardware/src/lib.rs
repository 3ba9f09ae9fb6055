//! Set-associative cache simulator library.
//!
//! This crate models a single data cache sitting in front of a flat, byte-addressable
//! memory. It provides the following:
//! 1. **Geometry:** Block size, block count and associativity resolved into sets and
//!    the address decomposition every other component relies on.
//! 2. **Cache:** Block table, lookup, LRU replacement and the write-back,
//!    write-allocate load/store data paths.
//! 3. **Memory:** The backing byte store, pre-seeded with a known pattern.
//! 4. **Simulation:** A simulator object owning cache, memory and counters, plus a
//!    line-oriented command interpreter for driving it from scripts.
//! 5. **Statistics:** Hit/miss tallies and cycle accounting.

/// Cache block table, geometry resolver and replacement policies.
pub mod cache;
/// Common types and constants (word size, limits, error types).
pub mod common;
/// Simulator configuration (defaults, geometry and memory sections).
pub mod config;
/// Backing store and memory dump windows.
pub mod memory;
/// Simulator object and command script interpreter.
pub mod sim;
/// Hit/miss and cycle statistics.
pub mod stats;

/// Cache model; owns the block table and the logical clock.
pub use crate::cache::CacheSim;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level simulator owning cache, memory and statistics.
pub use crate::sim::Simulator;
