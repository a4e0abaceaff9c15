// crates/causal-codegen/src/error.rs
// ============================================================================
// Module: Code Generation Errors
// Description: Error types for emitters, templates, and the compiler facade.
// Purpose: Keep failure meanings stable for the CLI and tests.
// Dependencies: causal-lang, thiserror
// ============================================================================

//! ## Overview
//! [`CodegenError`] covers programs that parse but cannot be expressed in a
//! target script. [`TemplateError`] covers template loading and splicing.
//! [`CompileError`] unifies both with [`ParseError`] for the facade.

use causal_lang::ParseError;
use thiserror::Error;

// ============================================================================
// SECTION: Emitter Errors
// ============================================================================

/// Errors raised while emitting Python from a parsed program.
///
/// # Invariants
/// - `position` fields are byte offsets into the source that was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// Variable used by an intention or condition appears in no effect.
    #[error("variable `{name}` at {position} does not appear in any effect")]
    UnknownArgument {
        /// Variable name.
        name: String,
        /// Byte offset of the construct using it.
        position: usize,
    },
    /// Variable used by an effect is not bound by the intention or condition.
    #[error("variable `{name}` at {position} is not bound by the intention or condition")]
    UnboundVariable {
        /// Variable name.
        name: String,
        /// Byte offset of the construct using it.
        position: usize,
    },
    /// Equality between two variables where neither side is bound.
    #[error("neither `{left}` nor `{right}` is bound in comparison at {position}")]
    UnboundVariables {
        /// Left variable.
        left: String,
        /// Right variable.
        right: String,
        /// Byte offset of the comparison.
        position: usize,
    },
    /// A binding comparison appears inside an `||` chain.
    #[error("`{name}` is bound at {position} inside an `||` condition")]
    BindingUnderOr {
        /// Variable that would be bound.
        name: String,
        /// Byte offset of the comparison.
        position: usize,
    },
    /// Construct that the target script cannot express.
    #[error("{construct} is not supported by the {target} target (at {position})")]
    Unsupported {
        /// Description of the construct.
        construct: &'static str,
        /// Target name.
        target: &'static str,
        /// Byte offset of the construct.
        position: usize,
    },
    /// Continuation marker that cannot be rendered.
    #[error("invalid continuation at {position}: {reason}")]
    InvalidContinuation {
        /// Why it was rejected.
        reason: &'static str,
        /// Byte offset of the action holding it.
        position: usize,
    },
    /// Rules for one intention disagree on their parameters.
    #[error("rule for `{intention}` at {position}: {reason}")]
    InconsistentIntention {
        /// Intention name.
        intention: String,
        /// What disagrees.
        reason: String,
        /// Byte offset of the offending rule's intention.
        position: usize,
    },
    /// Two intentions map to the same Python function name.
    #[error("intentions `{first}` and `{second}` both map to python function `{function}`")]
    DuplicateMethod {
        /// Generated function name.
        function: String,
        /// First intention.
        first: String,
        /// Second intention.
        second: String,
    },
}

impl CodegenError {
    /// Returns the byte offset associated with the error, when there is one.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::UnknownArgument {
                position, ..
            }
            | Self::UnboundVariable {
                position, ..
            }
            | Self::UnboundVariables {
                position, ..
            }
            | Self::BindingUnderOr {
                position, ..
            }
            | Self::Unsupported {
                position, ..
            }
            | Self::InvalidContinuation {
                position, ..
            }
            | Self::InconsistentIntention {
                position, ..
            } => Some(*position),
            Self::DuplicateMethod { .. } => None,
        }
    }
}

// ============================================================================
// SECTION: Template Errors
// ============================================================================

/// Errors raised while loading or splicing templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// IO error while reading a template.
    #[error("template io error: {0}")]
    Io(String),
    /// Template exceeds the size limit or is not UTF-8.
    #[error("invalid template: {0}")]
    Invalid(String),
    /// Template lacks the line generated code is spliced into.
    #[error("{template} template is missing marker `{marker}`")]
    MissingMarker {
        /// Template name.
        template: &'static str,
        /// Marker text.
        marker: &'static str,
    },
}

// ============================================================================
// SECTION: Compile Errors
// ============================================================================

/// Any failure between source text and a finished script.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Source did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Program could not be emitted.
    #[error("codegen error: {0}")]
    Codegen(#[from] CodegenError),
    /// Template could not be used.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl CompileError {
    /// Returns the source byte offset associated with the error, if any.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Parse(err) => err.position(),
            Self::Codegen(err) => err.position(),
            Self::Template(_) => None,
        }
    }
}
