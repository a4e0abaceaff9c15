// crates/causal-codegen/src/lib.rs
// ============================================================================
// Module: Causal Code Generation
// Description: Python emitters for causal-language programs.
// Purpose: Render CO-PCT facility domains and pyhop imitation scripts.
// Dependencies: causal-lang, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate turns a parsed causal program into the two Python scripts used
//! by the imitation-learning pipeline:
//!
//! - **Facility domain**: `causes(v)` and `M` for `copct.explain`, which
//!   infers intentions from a demonstration.
//! - **Imitation**: pyhop methods that decompose those intentions into
//!   primitive actions in a new situation.
//!
//! ### Design Notes
//! - Output is deterministic: rules render in source order and methods in
//!   order of first appearance.
//! - Targets are independent. A program may be valid for one and not the
//!   other.
//!
//! ## Index
//! - Facade: [`CausalCompiler`], [`Target`]
//! - Emitters: [`compile_facility`], [`compile_imitation`]
//! - Templates: [`Templates`]
//! - Errors: [`CodegenError`], [`TemplateError`], [`CompileError`]

pub mod compiler;
pub mod error;
pub mod facility;
pub mod imitation;
pub mod python;
pub mod template;

pub use compiler::CausalCompiler;
pub use compiler::Target;
pub use error::CodegenError;
pub use error::CompileError;
pub use error::TemplateError;
pub use facility::FacilityDomain;
pub use facility::compile_facility;
pub use imitation::compile_imitation;
pub use template::Templates;
