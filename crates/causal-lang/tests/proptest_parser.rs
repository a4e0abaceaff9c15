// crates/causal-lang/tests/proptest_parser.rs
// ============================================================================
// Module: Parser Property-Based Tests
// Description: Property tests for lexer and parser robustness.
// Purpose: Detect panics and position invariants across arbitrary input.
// ============================================================================

//! Property-based tests for lexer and parser invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use causal_lang::ParseLimits;
use causal_lang::line_column;
use causal_lang::parse_program;
use causal_lang::parse_program_with_limits;
use causal_lang::tokenize;
use proptest::prelude::*;

/// Punctuation and keywords of the language.
const FIXED_FRAGMENTS: &[&str] = &[
    "RULES", "{", "}", "(", ")", "[", "]", ",", ";", ":=", ":", "if", "&&", "||", "=", "!=",
    "TYPE", "ALL", "STATE", "'", ".", "-",
];

/// Token-shaped fragments that make near-valid programs more likely.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(FIXED_FRAGMENTS).prop_map(str::to_string),
        "CONT[0-9]{0,2}",
        "[a-z][a-z0-9_-]{0,6}",
        "[0-9]{1,3}",
        "PYTHON\\(#[a-z ]{0,4}#?\\)?",
    ]
}

fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0 .. 40).prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn tokenize_never_panics_on_arbitrary_text(input in ".{0,200}") {
        let _ = tokenize(&input);
    }

    #[test]
    fn parse_never_panics_on_token_soup(input in program_strategy()) {
        let _ = parse_program(&input);
    }

    #[test]
    fn token_positions_are_increasing_char_boundaries(input in program_strategy()) {
        if let Ok(tokens) = tokenize(&input) {
            let mut previous = None;
            for spanned in &tokens {
                prop_assert!(input.is_char_boundary(spanned.position));
                if let Some(previous) = previous {
                    prop_assert!(spanned.position >= previous);
                }
                previous = Some(spanned.position);
            }
        }
    }

    #[test]
    fn error_positions_stay_inside_input(input in program_strategy()) {
        if let Err(err) = parse_program(&input)
            && let Some(position) = err.position()
        {
            prop_assert!(position <= input.len());
            let (line, column) = line_column(&input, position);
            prop_assert!(line >= 1 && column >= 1);
        }
    }

    #[test]
    fn nesting_limit_is_never_exceeded(depth in 1usize .. 40, limit in 1usize .. 10) {
        let open = "(".repeat(depth);
        let close = ")".repeat(depth);
        let input = format!("RULES {{ if ({open}a = 1{close}): m(a) := f(a) }}");
        let limits = ParseLimits {
            max_nesting: limit,
            ..ParseLimits::default()
        };
        let result = parse_program_with_limits(&input, limits);
        prop_assert_eq!(result.is_ok(), depth <= limit);
    }
}
