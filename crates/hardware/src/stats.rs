//! Simulation statistics collection and reporting.
//!
//! This module tracks the cache's performance counters. It provides:
//! 1. **Accesses:** Loads, stores, hits and misses.
//! 2. **Miss breakdown:** Cold misses (empty set) versus conflict/capacity misses.
//! 3. **Traffic:** Dirty blocks written back to memory.
//! 4. **Cycles:** The running cycle total from per-access hit/miss costs.

use std::fmt;

use serde::Serialize;

use crate::cache::Access;

const RULE: &str = "==========================================================";
const THIN_RULE: &str = "----------------------------------------------------------";

/// Kind of memory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessKind {
    /// Word load.
    Load,
    /// Word store.
    Store,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of load operations.
    pub loads: u64,
    /// Number of store operations.
    pub stores: u64,
    /// Accesses that found their block resident.
    pub hits: u64,
    /// Accesses that had to fill a block.
    pub misses: u64,
    /// Misses to a set with no valid block.
    pub cold_misses: u64,
    /// Misses to a set holding other blocks.
    pub conflict_misses: u64,
    /// Dirty blocks written back, on eviction or flush.
    pub writebacks: u64,
    /// Total simulated cycles.
    pub cycles: u64,
}

impl CacheStats {
    /// Records one completed access costing `cycles`.
    pub const fn record(&mut self, kind: AccessKind, access: Access, cycles: u64) {
        match kind {
            AccessKind::Load => self.loads += 1,
            AccessKind::Store => self.stores += 1,
        }
        match access {
            Access::Hit => self.hits += 1,
            Access::Miss { cold, wrote_back } => {
                self.misses += 1;
                if cold {
                    self.cold_misses += 1;
                } else {
                    self.conflict_misses += 1;
                }
                if wrote_back {
                    self.writebacks += 1;
                }
            }
        }
        self.cycles += cycles;
    }

    /// Records blocks written back by an explicit flush.
    pub const fn record_flush(&mut self, written: usize) {
        self.writebacks += written as u64;
    }

    /// Total number of accesses.
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit, or 0.0 before any access.
    pub fn hit_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Fraction of accesses that missed, or 0.0 before any access.
    pub fn miss_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            total => self.misses as f64 / total as f64,
        }
    }

    /// Average cycles per access, or 0.0 before any access.
    pub fn average_cycles(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            total => self.cycles as f64 / total as f64,
        }
    }

    /// The compact `hits misses cycles` line printed by the `cycles` command.
    pub fn summary_line(&self) -> String {
        format!("{:3} {:3}   {}", self.hits, self.misses, self.cycles)
    }

    /// Prints the full report to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "CACHE SIMULATION STATISTICS")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "sim_cycles               {}", self.cycles)?;
        writeln!(f, "sim_accesses             {}", self.accesses())?;
        writeln!(f, "sim_avg_cycles           {:.2}", self.average_cycles())?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "ACCESSES")?;
        writeln!(f, "  op.load                {}", self.loads)?;
        writeln!(f, "  op.store               {}", self.stores)?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "CACHE")?;
        writeln!(
            f,
            "  hits                   {} ({:.2}%)",
            self.hits,
            self.hit_rate() * 100.0
        )?;
        writeln!(
            f,
            "  misses                 {} ({:.2}%)",
            self.misses,
            self.miss_rate() * 100.0
        )?;
        writeln!(f, "  misses.cold            {}", self.cold_misses)?;
        writeln!(f, "  misses.conflict        {}", self.conflict_misses)?;
        writeln!(f, "  writebacks             {}", self.writebacks)?;
        writeln!(f, "{RULE}")
    }
}
