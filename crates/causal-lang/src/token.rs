// crates/causal-lang/src/token.rs
// ============================================================================
// Module: Causal Language Tokens
// Description: Token kinds produced by the lexer.
// Purpose: Share one token vocabulary between the lexer, parser, and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Tokens borrow their text from the source input. Each token is paired with
//! its byte offset in a [`SpannedToken`] so diagnostics can point back at the
//! source.

use std::fmt;

// ============================================================================
// SECTION: Tokens
// ============================================================================

/// Lexer token produced from causal-language input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `;`
    Semicolon,
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `:`
    Colon,
    /// `:=`
    Define,
    /// `.`
    Dot,
    /// `'`
    Quote,
    /// `-`
    Minus,
    /// `RULES` keyword.
    Rules,
    /// `TYPE` keyword.
    Type,
    /// `ALL` keyword.
    All,
    /// `STATE` keyword.
    State,
    /// `if` keyword.
    If,
    /// Identifier (letters, digits, `-`, `_`; starts with a letter).
    Ident(&'a str),
    /// Unsigned run of decimal digits, kept verbatim.
    Digits(&'a str),
    /// Continuation marker `CONT` with its optional digit suffix.
    Continuation(&'a str),
    /// Inline python code between `PYTHON(#` and `#)`.
    Python(&'a str),
    /// End-of-input marker.
    Eof,
}

impl Token<'_> {
    /// Returns the stable upper-case kind name used by token listings.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Comma => "COMMA",
            Self::LBracket => "LBRACKET",
            Self::RBracket => "RBRACKET",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::Semicolon => "SEMI",
            Self::Eq => "EQUALS",
            Self::NotEq => "NEQUALS",
            Self::Lt => "LESS",
            Self::Gt => "GREATER",
            Self::LtEq => "LESSEQ",
            Self::GtEq => "GREATEREQ",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Colon => "COLON",
            Self::Define => "CAUSES",
            Self::Dot => "DOT",
            Self::Quote => "QUOTE",
            Self::Minus => "NEG",
            Self::Rules => "RULES",
            Self::Type => "TYPE",
            Self::All => "ALL",
            Self::State => "STATE",
            Self::If => "IF",
            Self::Ident(_) => "ID",
            Self::Digits(_) => "INTEGER",
            Self::Continuation(_) => "CONT",
            Self::Python(_) => "PYTHON",
            Self::Eof => "EOF",
        }
    }

    /// Returns true for the comparison operators `= != < > <= >=`.
    #[must_use]
    pub const fn is_comparison(&self) -> bool {
        matches!(self, Self::Eq | Self::NotEq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
            Self::LBracket => f.write_str("["),
            Self::RBracket => f.write_str("]"),
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::Semicolon => f.write_str(";"),
            Self::Eq => f.write_str("="),
            Self::NotEq => f.write_str("!="),
            Self::Lt => f.write_str("<"),
            Self::Gt => f.write_str(">"),
            Self::LtEq => f.write_str("<="),
            Self::GtEq => f.write_str(">="),
            Self::And => f.write_str("&&"),
            Self::Or => f.write_str("||"),
            Self::Colon => f.write_str(":"),
            Self::Define => f.write_str(":="),
            Self::Dot => f.write_str("."),
            Self::Quote => f.write_str("'"),
            Self::Minus => f.write_str("-"),
            Self::Rules => f.write_str("RULES"),
            Self::Type => f.write_str("TYPE"),
            Self::All => f.write_str("ALL"),
            Self::State => f.write_str("STATE"),
            Self::If => f.write_str("if"),
            Self::Ident(text) | Self::Digits(text) => f.write_str(text),
            Self::Continuation(suffix) => write!(f, "CONT{suffix}"),
            Self::Python(code) => write!(f, "PYTHON(#{code}#)"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

/// Token paired with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'a> {
    /// Token value.
    pub token: Token<'a>,
    /// Byte offset into the input.
    pub position: usize,
}
