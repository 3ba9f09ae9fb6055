//! Command Script Interpreter.
//!
//! Drives a [`Simulator`] from line-oriented text, one command per line:
//!
//! | command             | effect                                      |
//! |---------------------|---------------------------------------------|
//! | `lw <addr>`         | load a word through the cache               |
//! | `sw <addr> <value>` | store a word through the cache              |
//! | `show`              | print every cache block                     |
//! | `dump [addr]`       | print 64 bytes of raw memory                |
//! | `cycles`            | print `hits misses cycles`                  |
//! | `flush`             | write all dirty blocks back                 |
//! | `quit`              | stop reading                                |
//!
//! Tokens from `//` or `#` onwards are comments. Numbers follow C literal rules:
//! `0x` prefix for hex, a leading `0` for octal, decimal otherwise.
//! Unknown commands are ignored; malformed ones are reported and skipped.
//! Bytes that are not valid UTF-8 are read as U+FFFD, so they only affect the
//! token they appear in.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use tracing::{debug, warn};

use super::Simulator;
use crate::common::constants::WORD_ALIGN_MASK;
use crate::common::{BYTES_PER_WORD, ScriptError};

const LW_USAGE: &str = "lw <address to load>";
const SW_USAGE: &str = "sw <address to store> <word-size value to store>";

const GEOMETRY_PROMPTS: [&str; 3] = [
    "- words per block:  ",
    "- number of blocks: ",
    "- number of ways:   ",
];

/// A parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `lw <addr>`
    Load(u32),
    /// `sw <addr> <value>`
    Store {
        /// Target address.
        addr: u32,
        /// Word to store.
        value: u32,
    },
    /// `show`
    Show,
    /// `dump [addr]`; the address is already word-aligned.
    Dump(u32),
    /// `cycles`
    Cycles,
    /// `flush`
    Flush,
    /// `quit`
    Quit,
}

/// Output style for `show`, `dump` and `cycles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Fixed-width text.
    #[default]
    Text,
    /// One JSON document per command.
    Json,
}

/// Whether to keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Splits a line into tokens, dropping everything from a comment marker on.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace()
        .take_while(|token| !token.starts_with("//") && !token.starts_with('#'))
        .collect()
}

/// Parses an integer literal the way C's `strtoimax(s, NULL, 0)` reads it,
/// truncated to a 32-bit word.
///
/// # Errors
///
/// Returns [`ScriptError::InvalidNumber`] if the token is not a complete literal.
pub fn parse_number(token: &str) -> Result<u32, ScriptError> {
    let invalid = || ScriptError::InvalidNumber(token.to_owned());
    let (negative, unsigned) = token.strip_prefix('-').map_or_else(
        || (false, token.strip_prefix('+').unwrap_or(token)),
        |rest| (true, rest),
    );
    let (radix, digits) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .map_or_else(|| octal_or_decimal(unsigned), |hex| (16, hex));
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    let magnitude = u64::from_str_radix(digits, radix).map_err(|_| invalid())? as u32;
    Ok(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}

/// Radix and digits of a literal without a hex prefix.
fn octal_or_decimal(literal: &str) -> (u32, &str) {
    match literal.strip_prefix('0') {
        Some(digits) if !digits.is_empty() => (8, digits),
        _ => (10, literal),
    }
}

/// Parses a tokenized line. Returns `Ok(None)` for blank lines and unknown commands.
///
/// # Errors
///
/// Returns [`ScriptError::Usage`] on wrong arity and [`ScriptError::InvalidNumber`]
/// on a malformed argument.
pub fn parse_command(tokens: &[&str]) -> Result<Option<Command>, ScriptError> {
    let Some((&name, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let command = match name {
        "show" => Command::Show,
        "cycles" => Command::Cycles,
        "flush" => Command::Flush,
        "quit" => Command::Quit,
        "dump" => {
            let start = args.first().map(|token| parse_number(token)).transpose()?;
            Command::Dump(start.unwrap_or(0) & WORD_ALIGN_MASK)
        }
        "lw" => {
            let Some(addr) = args.first() else {
                return Err(ScriptError::Usage {
                    command: "lw",
                    usage: LW_USAGE,
                });
            };
            Command::Load(parse_number(addr)?)
        }
        "sw" => {
            let &[addr, value] = args else {
                return Err(ScriptError::Usage {
                    command: "sw",
                    usage: SW_USAGE,
                });
            };
            Command::Store {
                addr: parse_number(addr)?,
                value: parse_number(value)?,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// Executes commands against a simulator, writing their output to `out`.
#[derive(Debug)]
pub struct Interpreter<W> {
    out: W,
    format: OutputFormat,
    prompt: bool,
}

impl<W: Write> Interpreter<W> {
    /// Creates a silent (no prompt), text-mode interpreter.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            format: OutputFormat::Text,
            prompt: false,
        }
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enables the interactive `>> ` prompt and geometry prompts.
    #[must_use]
    pub const fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Consumes the interpreter, returning the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Reads the three leading integers of a script: words per block, number of
    /// blocks and number of ways. They may span several lines.
    ///
    /// Any tokens after the third integer on its line are discarded.
    ///
    /// # Errors
    ///
    /// [`ScriptError::MissingGeometry`] if input ends first, or a parse/I/O error.
    pub fn read_geometry<R: BufRead>(
        &mut self,
        input: &mut R,
    ) -> Result<(usize, usize, usize), ScriptError> {
        let mut values = Vec::with_capacity(GEOMETRY_PROMPTS.len());
        let mut pending: VecDeque<String> = VecDeque::new();
        let mut buf = Vec::new();
        while values.len() < GEOMETRY_PROMPTS.len() {
            if let Some(token) = pending.pop_front() {
                values.push(parse_number(&token)? as usize);
                continue;
            }
            if self.prompt {
                write!(self.out, "{}", GEOMETRY_PROMPTS[values.len()])?;
                self.out.flush()?;
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                return Err(ScriptError::MissingGeometry);
            }
            let line = String::from_utf8_lossy(&buf);
            pending.extend(tokenize(&line).into_iter().map(str::to_owned));
        }
        Ok((values[0], values[1], values[2]))
    }

    /// Runs every command in `input` until it ends or a `quit` is read.
    ///
    /// # Errors
    ///
    /// Only fatal errors (I/O, serialization) end the run; others are printed.
    pub fn run<R: BufRead>(&mut self, sim: &mut Simulator, input: R) -> Result<(), ScriptError> {
        self.show_prompt()?;
        for line in input.split(b'\n') {
            let line = line?;
            match self.execute_line(sim, &String::from_utf8_lossy(&line)) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(%err, "command skipped");
                    writeln!(self.out, "{err}")?;
                }
            }
            self.show_prompt()?;
        }
        Ok(())
    }

    /// Parses and executes a single line.
    ///
    /// # Errors
    ///
    /// Any parse, range or output error for this line.
    pub fn execute_line(&mut self, sim: &mut Simulator, line: &str) -> Result<Flow, ScriptError> {
        parse_command(&tokenize(line))?
            .map_or(Ok(Flow::Continue), |command| self.execute(sim, command))
    }

    /// Executes one command.
    ///
    /// # Errors
    ///
    /// [`ScriptError::AddressOutOfRange`] for addresses outside memory, or an
    /// output error.
    pub fn execute(&mut self, sim: &mut Simulator, command: Command) -> Result<Flow, ScriptError> {
        match command {
            Command::Load(addr) => {
                check_range(sim, addr, BYTES_PER_WORD)?;
                let (access, value) = sim.load(addr);
                debug!(addr, value, ?access, "lw");
            }
            Command::Store { addr, value } => {
                check_range(sim, addr, BYTES_PER_WORD)?;
                let access = sim.store(addr, value);
                debug!(addr, value, ?access, "sw");
            }
            Command::Show => {
                let dump = sim.dump_cache();
                match self.format {
                    OutputFormat::Text => write!(self.out, "{dump}")?,
                    OutputFormat::Json => writeln!(self.out, "{}", serde_json::to_string(&dump)?)?,
                }
            }
            Command::Dump(start) => {
                check_range(sim, start, 1)?;
                let window = sim.dump_memory(start);
                match self.format {
                    OutputFormat::Text => write!(self.out, "{window}")?,
                    OutputFormat::Json => {
                        writeln!(self.out, "{}", serde_json::to_string(&window)?)?;
                    }
                }
            }
            Command::Cycles => match self.format {
                OutputFormat::Text => writeln!(self.out, "{}", sim.stats().summary_line())?,
                OutputFormat::Json => {
                    writeln!(self.out, "{}", serde_json::to_string(sim.stats())?)?;
                }
            },
            Command::Flush => {
                let written = sim.flush();
                debug!(written, "flush");
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn show_prompt(&mut self) -> Result<(), ScriptError> {
        if self.prompt {
            write!(self.out, ">> ")?;
            self.out.flush()?;
        }
        Ok(())
    }
}

fn check_range(sim: &Simulator, addr: u32, len: usize) -> Result<(), ScriptError> {
    if sim.memory().contains(addr, len) {
        Ok(())
    } else {
        Err(ScriptError::AddressOutOfRange {
            addr,
            size: sim.memory().len(),
        })
    }
}
