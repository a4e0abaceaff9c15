// crates/causal-codegen/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers for causal-codegen integration tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions and the
//! canonical demo program.

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

use std::error::Error;
use std::fmt;

use causal_codegen::CausalCompiler;
use causal_lang::ParseLimits;

/// Canonical blocks program shared with the CLI demos.
const DEMO: &str = include_str!("../../../../demos/causes.txt");

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across causal-codegen integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl TestError {
    /// Creates a new test error with the provided message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError::new(message))) }
}

/// Parses the canonical blocks program.
///
/// # Errors
/// Returns the parse error if the demo no longer parses.
pub fn compile_demo() -> TestResult<CausalCompiler> {
    Ok(CausalCompiler::from_source(DEMO, ParseLimits::default())?)
}
