// crates/causal-compiler-cli/src/lib.rs
// ============================================================================
// Module: Causal Compiler CLI Library
// Description: Shared helpers for the causal-compiler binary.
// Purpose: Expose the message catalog and logging setup to the binary and tests.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! Support library for the `causal-compiler` binary: the [`t!`] message
//! catalog and the `tracing` subscriber setup.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
pub mod logging;
