// crates/causal-lang/src/lib.rs
// ============================================================================
// Module: Causal Language
// Description: Front end for the causal knowledge language.
// Purpose: Expose lexing, parsing, and the AST to code generators and tools.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The causal knowledge language lets domain authors state which sequences of
//! observed actions cause which intentions, for the cause-explanation and
//! imitation-learning tooling described by Katz and Reggia
//! (<https://link.springer.com/chapter/10.1007/978-3-319-41649-6_7>). The
//! imitation software itself lives at <http://viceroy.cs.umd.edu/>.
//!
//! ```
//! use causal_lang::parse_program;
//!
//! let program = parse_program(
//!     "RULES { if (TYPE(obj) = 'block'): stack(dest, obj) := move-to(obj, dest) }",
//! )
//! .unwrap();
//! assert_eq!(program.rules[0].intention.name, "stack");
//! assert_eq!(program.max_effects(), 1);
//! ```
//!
//! Security posture: source text is untrusted; [`ParseLimits`] bounds input
//! size and nesting depth.
//!
//! ## Index
//! - Lexing: [`tokenize`], [`Token`], [`SpannedToken`]
//! - Parsing: [`parse_program`], [`parse_program_with_limits`], [`ParseLimits`]
//! - Diagnostics: [`ParseError`], [`line_column`]

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Program;
pub use error::ParseError;
pub use error::line_column;
pub use lexer::tokenize;
pub use parser::MAX_INPUT_BYTES;
pub use parser::MAX_NESTING;
pub use parser::ParseLimits;
pub use parser::parse_program;
pub use parser::parse_program_with_limits;
pub use token::SpannedToken;
pub use token::Token;
