//! Simulation driver.
//!
//! Provides the [`Simulator`] that owns cache, memory and statistics, and the
//! command interpreter used to drive it from scripts or a terminal.

/// Command script parsing and execution.
pub mod script;
/// Simulator object.
pub mod simulator;

pub use script::{Command, Interpreter, OutputFormat};
pub use simulator::Simulator;
