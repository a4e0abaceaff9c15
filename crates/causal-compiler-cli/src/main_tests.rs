// crates/causal-compiler-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads, atomic writes, and diagnostics.
// Purpose: Ensure CLI file handling fails closed and output is well located.
// Dependencies: causal-compiler-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit`, `write_atomic`, target selection, and
//! `line:column` diagnostics used by the CLI entry point.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use causal_codegen::Target;
use causal_compiler_config::OutputConfig;
use causal_lang::ParseLimits;
use clap::Parser;

use super::Cli;
use super::Commands;
use super::ReadLimitError;
use super::Source;
use super::SourceArgs;
use super::TargetArg;
use super::diagnostic;
use super::output_file_name;
use super::read_bytes_with_limit;
use super::read_source;
use super::write_atomic;

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_file_at_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("causes.txt");
    fs::write(&path, b"RULES {}").unwrap();
    let bytes = read_bytes_with_limit(&path, 8).unwrap();
    assert_eq!(bytes, b"RULES {}");
}

#[test]
fn read_bytes_with_limit_rejects_oversized_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("causes.txt");
    fs::write(&path, vec![b'a'; 32]).unwrap();
    match read_bytes_with_limit(&path, 16) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 32);
            assert_eq!(limit, 16);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_bytes_with_limit(&dir.path().join("absent.txt"), 16);
    assert!(matches!(result, Err(ReadLimitError::Io(_))));
}

#[test]
fn read_source_rejects_oversized_inline_text() {
    let args = SourceArgs {
        input: None,
        text: Some("RULES { a() := b() }".to_string()),
    };
    let limits = ParseLimits {
        max_input_bytes: 4,
        ..ParseLimits::default()
    };
    let Err(err) = read_source(&args, limits) else {
        panic!("expected inline text to be rejected");
    };
    assert!(err.to_string().contains("limit 4"));
}

#[test]
fn read_source_rejects_non_utf8_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("causes.txt");
    fs::write(&path, [0xFF, 0xFE]).unwrap();
    let args = SourceArgs {
        input: Some(path),
        text: None,
    };
    let Err(err) = read_source(&args, ParseLimits::default()) else {
        panic!("expected non-utf8 source to be rejected");
    };
    assert!(err.to_string().contains("not valid UTF-8"));
}

// ============================================================================
// SECTION: Atomic Writes
// ============================================================================

#[test]
fn write_atomic_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("imitation.py");
    fs::write(&path, "old").unwrap();
    write_atomic(&path, b"new").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn write_atomic_fails_when_directory_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("imitation.py");
    assert!(write_atomic(&path, b"new").is_err());
    assert!(!path.exists());
}

// ============================================================================
// SECTION: Targets and Diagnostics
// ============================================================================

#[test]
fn target_arg_selects_generation_order() {
    assert_eq!(TargetArg::All.targets(), &[Target::Facility, Target::Imitation]);
    assert_eq!(TargetArg::Facility.targets(), &[Target::Facility]);
    assert_eq!(TargetArg::Imitation.targets(), &[Target::Imitation]);
}

#[test]
fn output_file_name_follows_config() {
    let output = OutputConfig {
        facility_file: "domain.py".to_string(),
        ..OutputConfig::default()
    };
    assert_eq!(output_file_name(&output, Target::Facility), "domain.py");
    assert_eq!(output_file_name(&output, Target::Imitation), "imitation.py");
}

#[test]
fn diagnostic_reports_line_and_column() {
    let source = Source {
        label: "causes.txt".to_string(),
        text: "RULES {\n  a( := b()\n}".to_string(),
    };
    let message = diagnostic(&source, Some(12), &"unexpected token");
    assert_eq!(message, "causes.txt:2:5: unexpected token");
    let message = diagnostic(&source, None, &"no rules");
    assert_eq!(message, "causes.txt: no rules");
}

#[test]
fn cli_rejects_both_input_and_text() {
    let parsed =
        Cli::try_parse_from(["causal-compiler", "tokens", "--input", "a.txt", "--text", "RULES {}"]);
    assert!(parsed.is_err());
}

#[test]
fn cli_requires_a_source() {
    assert!(Cli::try_parse_from(["causal-compiler", "compile"]).is_err());
}

#[test]
fn cli_parses_compile_with_target() {
    let cli = Cli::try_parse_from([
        "causal-compiler",
        "compile",
        "--text",
        "RULES {}",
        "--target",
        "imitation",
        "--out-dir",
        "gen",
    ])
    .unwrap();
    let Some(Commands::Compile(command)) = cli.command else {
        panic!("expected compile command");
    };
    assert_eq!(command.target, TargetArg::Imitation);
    assert_eq!(command.out_dir.as_deref(), Some(std::path::Path::new("gen")));
    assert_eq!(command.source.text.as_deref(), Some("RULES {}"));
}
