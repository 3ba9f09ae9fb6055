//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Constants:** Word size, block size and count limits, dump window size and address width.
//! 2. **Error Handling:** Configuration and command errors.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for configuration and command processing.
pub mod error;

pub use constants::{ADDRESS_BITS, BYTES_PER_WORD, MAX_BLOCKS, MAX_WORDS_PER_BLOCK};
pub use error::{ConfigError, ScriptError};
