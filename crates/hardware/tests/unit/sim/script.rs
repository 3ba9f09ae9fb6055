//! Command Script Tests.
//!
//! Covers tokenizing and number parsing, command parsing with usage errors,
//! and whole scripts run through the interpreter, including the geometry
//! header, comments, prompts and JSON output.

use std::fs::File;
use std::io::{BufReader, Write};

use cachesim_core::common::{ConfigError, ScriptError};
use cachesim_core::config::CacheConfig;
use cachesim_core::memory::Memory;
use cachesim_core::sim::script::{Flow, parse_command, parse_number, tokenize};
use cachesim_core::sim::{Command, Interpreter, OutputFormat, Simulator};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::{MEMORY_SIZE, run_script, simulator};

// ══════════════════════════════════════════════════════════
// 1. Tokens and numbers
// ══════════════════════════════════════════════════════════

#[test]
fn tokenize_splits_on_whitespace() {
    assert_eq!(tokenize("  sw\t0x10   42 \n"), vec!["sw", "0x10", "42"]);
    assert!(tokenize("   ").is_empty());
}

#[rstest]
#[case("lw 0 // trailing comment", vec!["lw", "0"])]
#[case("lw 0 # trailing comment", vec!["lw", "0"])]
#[case("// whole line", vec![])]
#[case("#whole line", vec![])]
#[case("sw 4 5 //no space", vec!["sw", "4", "5"])]
fn tokenize_drops_comments(#[case] line: &str, #[case] expected: Vec<&str>) {
    assert_eq!(tokenize(line), expected);
}

#[rstest]
#[case("0", 0)]
#[case("42", 42)]
#[case("0x10", 16)]
#[case("0X1f", 31)]
#[case("0xCAFEBABE", 0xCAFE_BABE)]
#[case("010", 8)]
#[case("+7", 7)]
#[case("-1", 0xFFFF_FFFF)]
#[case("-0x10", 0xFFFF_FFF0)]
#[case("4294967296", 0)]
fn parse_number_c_literals(#[case] token: &str, #[case] expected: u32) {
    assert_eq!(parse_number(token).expect("valid literal"), expected);
}

/// Partial literals are refused as a whole rather than read up to the first
/// bad digit.
#[rstest]
#[case("")]
#[case("abc")]
#[case("0x")]
#[case("12abc")]
#[case("08")]
#[case("09")]
#[case("-")]
fn parse_number_rejects_garbage(#[case] token: &str) {
    match parse_number(token) {
        Err(ScriptError::InvalidNumber(t)) => assert_eq!(t, token),
        other => panic!("expected InvalidNumber for {token:?}, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════
// 2. Commands
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(&["lw", "0x20"], Command::Load(0x20))]
#[case(&["sw", "8", "0xff"], Command::Store { addr: 8, value: 0xff })]
#[case(&["show"], Command::Show)]
#[case(&["dump"], Command::Dump(0))]
#[case(&["dump", "0x13"], Command::Dump(0x10))]
#[case(&["cycles"], Command::Cycles)]
#[case(&["flush"], Command::Flush)]
#[case(&["quit"], Command::Quit)]
fn parse_known_commands(#[case] tokens: &[&str], #[case] expected: Command) {
    assert_eq!(
        parse_command(tokens).expect("valid command"),
        Some(expected)
    );
}

#[test]
fn unknown_and_blank_lines_are_ignored() {
    assert_eq!(parse_command(&[]).expect("blank"), None);
    assert_eq!(parse_command(&["nop", "1"]).expect("unknown"), None);
}

#[test]
fn lw_without_address_is_usage_error() {
    let err = parse_command(&["lw"]).expect_err("missing address");
    assert_eq!(
        err.to_string(),
        "Wrong input for lw\nUsage: lw <address to load>"
    );
}

#[rstest]
#[case(&["sw"])]
#[case(&["sw", "0"])]
#[case(&["sw", "0", "1", "2"])]
fn sw_wrong_arity_is_usage_error(#[case] tokens: &[&str]) {
    assert!(matches!(
        parse_command(tokens),
        Err(ScriptError::Usage { command: "sw", .. })
    ));
}

// ══════════════════════════════════════════════════════════
// 3. Interpreter
// ══════════════════════════════════════════════════════════

#[test]
fn cycles_after_mixed_accesses() {
    let mut sim = simulator(4, 16, 2);
    let out = run_script(
        &mut sim,
        "lw 0\nlw 0\nsw 0 0xcafebabe   // hit\n# comment only\n\ncycles\n",
    );
    assert_eq!(out, "  2   1   102\n");
}

#[test]
fn malformed_commands_are_reported_and_skipped() {
    let mut sim = simulator(4, 16, 2);
    let out = run_script(&mut sim, "lw\nsw 4\nlw zz\nlw 4\ncycles\n");
    assert_eq!(
        out,
        concat!(
            "Wrong input for lw\nUsage: lw <address to load>\n",
            "Wrong input for sw\nUsage: sw <address to store> <word-size value to store>\n",
            "invalid number `zz`\n",
            "  0   1   100\n",
        )
    );
}

#[test]
fn out_of_range_address_is_rejected_before_the_cache() {
    let mut sim = simulator(4, 16, 2);
    let out = run_script(&mut sim, "lw 0x2000\nsw 8190 1\nlw 8188\n");
    assert_eq!(
        out,
        concat!(
            "address 0x00002000 is outside the 8192-byte memory\n",
            "address 0x00001ffe is outside the 8192-byte memory\n",
        )
    );
    assert_eq!(sim.stats().accesses(), 1);
}

/// Bytes that are not UTF-8 only spoil the token they sit in; the run goes on.
#[test]
fn invalid_utf8_does_not_end_the_run() {
    let mut sim = simulator(4, 16, 2);
    let input: &[u8] = b"lw 0\n# caf\xe9 comment\nlw 0\nlw \xff\ncycles\n";
    let mut interpreter = Interpreter::new(Vec::new());
    interpreter.run(&mut sim, input).expect("script runs");

    let out = String::from_utf8(interpreter.into_inner()).expect("utf-8");
    assert_eq!(out, "invalid number `\u{fffd}`\n  1   1   101\n");
    assert_eq!(sim.stats().hits, 1);
    assert_eq!(sim.stats().misses, 1);
}

#[test]
fn quit_stops_reading() {
    let mut sim = simulator(4, 16, 2);
    let _ = run_script(&mut sim, "lw 0\nquit\nlw 128\n");
    assert_eq!(sim.stats().accesses(), 1);
    assert!(!sim.cache().contains(128));
}

#[test]
fn show_prints_cache_dump() {
    let mut sim = simulator(1, 2, 1);
    let out = run_script(&mut sim, "sw 4 0x01020304\nshow\n");
    assert_eq!(out, sim.dump_cache().to_string());
    assert_eq!(
        out,
        concat!(
            "[  0]           0        0 | 00000000 \n",
            "[  1] vd        0        0 | 01020304 \n",
        )
    );
}

#[test]
fn dump_prints_memory_not_cache() {
    let mut sim = simulator(4, 16, 2);
    let out = run_script(&mut sim, "sw 0 0xffffffff\ndump\nflush\ndump 2\n");
    let mut lines = out.lines();
    assert_eq!(
        lines.next(),
        Some("[0x00000000] 00000000 00000000 00000000 00000000 ")
    );
    assert_eq!(
        lines.nth(3),
        Some("[0x00000000] ffffffff 00000000 00000000 00000000 ")
    );
}

#[test]
fn json_output() {
    let mut sim = simulator(4, 16, 2);
    let mut interpreter = Interpreter::new(Vec::new()).with_format(OutputFormat::Json);
    interpreter
        .run(&mut sim, "lw 0\nlw 0\ncycles\nshow\ndump 16\n".as_bytes())
        .expect("script runs");
    let out = String::from_utf8(interpreter.into_inner()).expect("utf-8");
    let docs: Vec<serde_json::Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).expect("one JSON document per line"))
        .collect();

    assert_eq!(docs.len(), 3);
    assert_eq!(docs[0]["hits"], 1);
    assert_eq!(docs[0]["misses"], 1);
    assert_eq!(docs[0]["cycles"], 101);
    assert_eq!(docs[1]["sets"].as_array().map(Vec::len), Some(8));
    assert_eq!(docs[2]["start"], 16);
}

#[test]
fn execute_reports_flow() {
    let mut sim = simulator(4, 16, 2);
    let mut interpreter = Interpreter::new(Vec::new());
    assert_eq!(
        interpreter
            .execute(&mut sim, Command::Load(0))
            .expect("load"),
        Flow::Continue
    );
    assert_eq!(
        interpreter.execute_line(&mut sim, "quit").expect("quit"),
        Flow::Quit
    );
}

// ══════════════════════════════════════════════════════════
// 4. Geometry header
// ══════════════════════════════════════════════════════════

/// The three header integers may be split across lines; the rest of the
/// input is left for the command loop.
#[test]
fn geometry_header_then_commands() {
    let mut input = "4\n16 2   // words, blocks, ways\nlw 0\nlw 4\ncycles\n".as_bytes();
    let mut interpreter = Interpreter::new(Vec::new());

    let (words, blocks, ways) = interpreter
        .read_geometry(&mut input)
        .expect("header present");
    assert_eq!((words, blocks, ways), (4, 16, 2));

    let mut sim = Simulator::with_memory(
        &CacheConfig::new(words, blocks, ways),
        Memory::new(MEMORY_SIZE),
    )
    .expect("valid geometry");
    interpreter.run(&mut sim, input).expect("script runs");
    let out = String::from_utf8(interpreter.into_inner()).expect("utf-8");
    assert_eq!(out, "  1   1   101\n");
}

#[test]
fn truncated_header_is_fatal() {
    let mut input = "4 16\n".as_bytes();
    let mut interpreter = Interpreter::new(Vec::new());
    let err = interpreter
        .read_geometry(&mut input)
        .expect_err("header incomplete");
    assert!(matches!(err, ScriptError::MissingGeometry));
    assert!(err.is_fatal());
}

#[test]
fn header_tolerates_invalid_utf8_comment() {
    let mut input: &[u8] = b"4 16 2 // caf\xe9\nlw 0\n";
    let mut interpreter = Interpreter::new(Vec::new());
    assert_eq!(
        interpreter.read_geometry(&mut input).expect("valid header"),
        (4, 16, 2)
    );
    assert_eq!(input, b"lw 0\n");
}

/// A header asking for a billion blocks is refused before the block table is
/// allocated.
#[test]
fn oversized_header_geometry_rejected() {
    let mut input = "1 1073741824 1\n".as_bytes();
    let mut interpreter = Interpreter::new(Vec::new());
    let (words, blocks, ways) = interpreter.read_geometry(&mut input).expect("header");

    let err = Simulator::with_memory(
        &CacheConfig::new(words, blocks, ways),
        Memory::new(MEMORY_SIZE),
    )
    .expect_err("too many blocks");
    assert!(matches!(err, ConfigError::TooManyBlocks { .. }));
    assert!(ScriptError::from(err).is_fatal());
}

#[test]
fn header_numbers_use_c_literals() {
    let mut input = "0x8 040 0b1\n".as_bytes();
    let mut interpreter = Interpreter::new(Vec::new());
    assert!(matches!(
        interpreter.read_geometry(&mut input),
        Err(ScriptError::InvalidNumber(t)) if t == "0b1"
    ));

    let mut input = "0x8 040 4\n".as_bytes();
    assert_eq!(
        interpreter.read_geometry(&mut input).expect("valid header"),
        (8, 32, 4)
    );
}

#[test]
fn prompts_in_interactive_mode() {
    let mut input = "1\n2\n1\nlw 0\n".as_bytes();
    let mut interpreter = Interpreter::new(Vec::new()).with_prompt(true);
    let _ = interpreter.read_geometry(&mut input).expect("header");
    let mut sim = simulator(1, 2, 1);
    interpreter.run(&mut sim, input).expect("script runs");

    let out = String::from_utf8(interpreter.into_inner()).expect("utf-8");
    assert_eq!(
        out,
        "- words per block:  - number of blocks: - number of ways:   >> >> "
    );
}

/// Scripts are ordinary files; the interpreter reads them through any `BufRead`.
#[test]
fn script_file_runs_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "1 4 2").expect("write header");
    writeln!(file, "sw 0 0xCAFEBABE").expect("write");
    writeln!(file, "lw 4").expect("write");
    writeln!(file, "show").expect("write");
    writeln!(file, "cycles").expect("write");

    let mut input = BufReader::new(File::open(file.path()).expect("reopen"));
    let mut interpreter = Interpreter::new(Vec::new());
    let (words, blocks, ways) = interpreter.read_geometry(&mut input).expect("header");
    let mut sim = Simulator::with_memory(
        &CacheConfig::new(words, blocks, ways),
        Memory::new(MEMORY_SIZE),
    )
    .expect("valid geometry");
    interpreter.run(&mut sim, input).expect("script runs");

    let out = String::from_utf8(interpreter.into_inner()).expect("utf-8");
    assert_eq!(
        out,
        concat!(
            "[  0] vd        0        0 | cafebabe \n",
            "[  1]           0        0 | 00000000 \n",
            "\n",
            "[  2] v         0        1 | 00000000 \n",
            "[  3]           0        0 | 00000000 \n",
            "\n",
            "  0   2   200\n",
        )
    );
}
