//! Cache simulator CLI.
//!
//! This binary runs a command script against a set-associative cache. It supports:
//! 1. **Script run:** Execute a file of `lw`/`sw`/`show`/`dump`/`cycles` commands.
//! 2. **Interactive run:** Read the same commands from a terminal with a `>> ` prompt.
//! 3. **Geometry:** From flags, from a JSON config file, or, when neither is
//!    given, from the first three integers of the input.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::ScriptError;
use cachesim_core::config::Config;
use cachesim_core::memory::Memory;
use cachesim_core::sim::{Interpreter, OutputFormat, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Set-associative cache simulator",
    long_about = "Simulate a write-back, write-allocate LRU cache in front of an 8 KiB memory.\n\nWithout geometry flags or --config, the input starts with three integers:\nwords per block, number of blocks, number of ways.\n\nExamples:\n  cachesim traces/lru.txt\n  cachesim -w 4 -b 16 -a 2 traces/body.txt --stats\n  cachesim --config traces/cache.json --json < traces/body.txt"
)]
struct Cli {
    /// Command script to run; reads stdin when omitted.
    script: Option<PathBuf>,

    /// Block size in 4-byte words.
    #[arg(short = 'w', long)]
    words_per_block: Option<usize>,

    /// Number of cache blocks.
    #[arg(short, long)]
    blocks: Option<usize>,

    /// Number of ways (1 = direct-mapped, equal to --blocks = fully associative).
    #[arg(short = 'a', long)]
    ways: Option<usize>,

    /// JSON configuration file (`cache` and `memory` sections).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cycles charged per hit.
    #[arg(long)]
    cycles_hit: Option<u64>,

    /// Cycles charged per miss.
    #[arg(long)]
    cycles_miss: Option<u64>,

    /// Start from zeroed memory instead of the seed pattern.
    #[arg(long)]
    zeroed: bool,

    /// Write dirty blocks back when the input ends, then dump every 64-byte
    /// window of memory the run changed.
    #[arg(long)]
    flush_on_exit: bool,

    /// Print a statistics report when the input ends.
    #[arg(long)]
    stats: bool,

    /// Print dumps and statistics as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// True when the geometry comes from flags or a config file rather than the input.
    const fn has_geometry(&self) -> bool {
        self.config.is_some()
            || self.words_per_block.is_some()
            || self.blocks.is_some()
            || self.ways.is_some()
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .compact()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("[!] {e}");
        process::exit(1);
    }
}

/// Builds the simulator, runs the input through it and prints the final report.
fn run(cli: &Cli) -> Result<(), ScriptError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(cycles) = cli.cycles_hit {
        config.cache.cycles_hit = cycles;
    }
    if let Some(cycles) = cli.cycles_miss {
        config.cache.cycles_miss = cycles;
    }
    if cli.zeroed {
        config.memory.seeded = false;
    }

    let interactive = cli.script.is_none() && io::stdin().is_terminal();
    if interactive {
        println!("cachesim {}", env!("CARGO_PKG_VERSION"));
        println!();
    }

    let mut input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut interpreter = Interpreter::new(io::stdout().lock())
        .with_format(format)
        .with_prompt(interactive);

    if cli.has_geometry() {
        if let Some(words) = cli.words_per_block {
            config.cache.words_per_block = words;
        }
        if let Some(blocks) = cli.blocks {
            config.cache.nr_blocks = blocks;
        }
        if let Some(ways) = cli.ways {
            config.cache.nr_ways = ways;
        }
    } else {
        let (words, blocks, ways) = interpreter.read_geometry(&mut input)?;
        config.cache.words_per_block = words;
        config.cache.nr_blocks = blocks;
        config.cache.nr_ways = ways;
    }

    let mut sim = Simulator::new(&config)?;
    let initial = cli.flush_on_exit.then(|| sim.memory().clone());
    interpreter.run(&mut sim, input)?;
    let mut out = interpreter.into_inner();

    let stats = if let Some(initial) = initial {
        let (memory, stats) = sim.finish();
        write_changed_memory(&mut out, &memory, &initial, format)?;
        stats
    } else {
        *sim.stats()
    };
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        cycles = stats.cycles,
        "run complete"
    );

    if cli.stats {
        if cli.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
        } else {
            write!(out, "{stats}")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Dumps every window of `memory` that differs from `initial`.
fn write_changed_memory(
    out: &mut impl Write,
    memory: &Memory,
    initial: &Memory,
    format: OutputFormat,
) -> Result<(), ScriptError> {
    for window in memory.changed_windows(initial) {
        match format {
            OutputFormat::Text => write!(out, "{window}")?,
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&window)?)?,
        }
    }
    Ok(())
}
