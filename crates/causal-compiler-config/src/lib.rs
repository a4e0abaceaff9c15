// crates/causal-compiler-config/src/lib.rs
// ============================================================================
// Module: Causal Compiler Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for causal-compiler.toml semantics.
// Dependencies: causal-lang, serde, toml
// ============================================================================

//! ## Overview
//! `causal-compiler-config` defines the configuration model for the causal
//! compiler CLI: output layout, template overrides, logging, and parser
//! limits. Validation is strict and fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
