// crates/causal-lang/tests/lexer.rs
// ============================================================================
// Module: Lexer Tests
// Description: Token stream coverage for causal-language source.
// Purpose: Pin token kinds, positions, and lexical error reporting.
// Dependencies: causal_lang::lexer
// ============================================================================
//! ## Overview
//! Integration tests for [`causal_lang::tokenize`]: multi-byte operators,
//! hyphenated identifiers, keywords, continuation markers, inline python,
//! and lexical errors with their byte offsets.

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

mod support;

use causal_lang::ParseError;
use causal_lang::Token;
use causal_lang::tokenize;
use support::TestResult;
use support::ensure;

fn kinds(input: &str) -> Vec<&'static str> {
    tokenize(input).unwrap().iter().map(|spanned| spanned.token.kind()).collect()
}

/// Tests operators that share a first character.
#[test]
fn test_two_character_operators() -> TestResult {
    let found = kinds(":= : <= < >= > != && ||");
    ensure(
        found
            == [
                "CAUSES",
                "COLON",
                "LESSEQ",
                "LESS",
                "GREATEREQ",
                "GREATER",
                "NEQUALS",
                "AND",
                "OR",
                "EOF",
            ],
        format!("unexpected kinds {found:?}"),
    )?;
    Ok(())
}

/// Tests that hyphenated and underscored names are single identifiers.
#[test]
fn test_identifiers_keep_hyphens_and_underscores() -> TestResult {
    let tokens = tokenize("move-to stack_all x1").unwrap();
    ensure(tokens[0].token == Token::Ident("move-to"), "move-to should be one identifier")?;
    ensure(tokens[1].token == Token::Ident("stack_all"), "stack_all should be one identifier")?;
    ensure(tokens[2].token == Token::Ident("x1"), "x1 should be one identifier")?;
    ensure(tokens[1].position == 8, "positions are byte offsets")?;
    Ok(())
}

/// Tests keyword recognition is case sensitive.
#[test]
fn test_keywords_are_case_sensitive() -> TestResult {
    let found = kinds("RULES TYPE ALL STATE if IF rules");
    ensure(
        found == ["RULES", "TYPE", "ALL", "STATE", "IF", "ID", "ID", "EOF"],
        format!("unexpected kinds {found:?}"),
    )?;
    Ok(())
}

/// Tests that numbers lex as digit runs with separate dots and signs.
#[test]
fn test_numbers_are_split_into_digits_and_dots() -> TestResult {
    let tokens = tokenize("-0.05").unwrap();
    ensure(tokens[0].token == Token::Minus, "leading minus")?;
    ensure(tokens[1].token == Token::Digits("0"), "integer digits")?;
    ensure(tokens[2].token == Token::Dot, "decimal point")?;
    ensure(tokens[3].token == Token::Digits("05"), "fraction digits keep leading zero")?;
    Ok(())
}

/// Tests inline python capture inside an argument list.
#[test]
fn test_inline_python_is_a_single_token() -> TestResult {
    let tokens = tokenize("f(PYTHON(#state.objs['a'][0]#), b)").unwrap();
    ensure(
        tokens[2].token == Token::Python("state.objs['a'][0]"),
        "python body should be captured verbatim",
    )?;
    ensure(tokens[3].token == Token::Comma, "lexing resumes after `#)`")?;
    Ok(())
}

/// Tests that the end marker sits at the input length.
#[test]
fn test_eof_position_is_input_length() -> TestResult {
    let input = "RULES { }  ";
    let tokens = tokenize(input).unwrap();
    let last = tokens.last().unwrap();
    ensure(last.token == Token::Eof, "last token is EOF")?;
    ensure(last.position == input.len(), "EOF sits at the input length")?;
    Ok(())
}

/// Tests lexical error variants and offsets.
#[test]
fn test_lexical_errors_report_offsets() -> TestResult {
    ensure(tokenize("  \n\t").unwrap_err() == ParseError::EmptyInput, "blank input")?;
    ensure(
        tokenize("a $ b").unwrap_err()
            == ParseError::UnexpectedCharacter {
                found: '$',
                position: 2,
            },
        "stray character",
    )?;
    ensure(
        tokenize("a & b").unwrap_err().position() == Some(2),
        "lone ampersand is reported at its offset",
    )?;
    ensure(
        tokenize("x é").unwrap_err()
            == ParseError::UnexpectedCharacter {
                found: 'é',
                position: 2,
            },
        "non-ascii characters are reported whole",
    )?;
    Ok(())
}
