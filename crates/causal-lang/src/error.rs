// crates/causal-lang/src/error.rs
// ============================================================================
// Module: Causal Language Errors
// Description: Structured diagnostics for lexing, parsing, and validation.
// Purpose: Report byte-positioned failures that callers can map to lines.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every failure raised while reading causal-language source is a
//! [`ParseError`]. Positions are byte offsets into the original input; use
//! [`line_column`] to turn them into 1-based line and column numbers.

use std::fmt;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that can occur while lexing, parsing, or validating a program.
///
/// # Invariants
/// - Every positioned variant carries a byte offset inside the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty or contained only whitespace.
    EmptyInput,
    /// Input exceeded the configured size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Input exceeded the configured nesting depth.
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Actual nesting depth when the error occurred.
        actual_depth: usize,
        /// Byte offset in the original input.
        position: usize,
    },
    /// A character that starts no token.
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected token encountered during lexing or parsing.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Inline python block missing its closing `#)`.
    UnterminatedPython {
        /// Byte offset of the `PYTHON` keyword.
        position: usize,
    },
    /// Continuation marker used where it cannot apply.
    InvalidContinuation {
        /// Why the marker was rejected.
        reason: &'static str,
        /// Byte offset of the marker.
        position: usize,
    },
    /// Unexpected trailing input after a complete program.
    TrailingInput {
        /// Byte offset where unexpected input begins.
        position: usize,
    },
}

impl ParseError {
    /// Returns the byte offset associated with the error, when there is one.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::EmptyInput | Self::InputTooLarge { .. } => None,
            Self::NestingTooDeep {
                position, ..
            }
            | Self::UnexpectedCharacter {
                position, ..
            }
            | Self::UnexpectedToken {
                position, ..
            }
            | Self::UnterminatedPython {
                position,
            }
            | Self::InvalidContinuation {
                position, ..
            }
            | Self::TrailingInput {
                position,
            } => Some(*position),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => {
                write!(f, "input exceeds size limit: {actual_bytes} bytes (max {max_bytes})")
            }
            Self::NestingTooDeep {
                max_depth,
                actual_depth,
                position,
            } => write!(
                f,
                "input nesting exceeds limit: depth {actual_depth} (max {max_depth}) at {position}"
            ),
            Self::UnexpectedCharacter {
                found,
                position,
            } => write!(f, "unexpected character `{found}` at {position}"),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => {
                write!(f, "unexpected token `{found}` at {position}, expected {expected}")
            }
            Self::UnterminatedPython {
                position,
            } => write!(f, "inline python starting at {position} is missing its closing `#)`"),
            Self::InvalidContinuation {
                reason,
                position,
            } => write!(f, "invalid continuation at {position}: {reason}"),
            Self::TrailingInput {
                position,
            } => {
                write!(f, "unexpected trailing input at {position}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// SECTION: Positions
// ============================================================================

/// Converts a byte offset into a 1-based `(line, column)` pair.
///
/// Offsets past the end clamp to the end of input. Columns count characters,
/// not bytes.
#[must_use]
pub fn line_column(input: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (offset, ch) in input.char_indices() {
        if offset >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn line_column_counts_newlines() {
        let input = "RULES {\n  a() := b()\n}";
        assert_eq!(line_column(input, 0), (1, 1));
        assert_eq!(line_column(input, 10), (2, 3));
        assert_eq!(line_column(input, 1_000), (3, 2));
    }

    #[test]
    fn position_is_absent_for_size_errors() {
        let err = ParseError::InputTooLarge {
            max_bytes: 1,
            actual_bytes: 2,
        };
        assert_eq!(err.position(), None);
        assert_eq!(ParseError::TrailingInput { position: 7 }.position(), Some(7));
    }
}
