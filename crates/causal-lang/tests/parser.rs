// crates/causal-lang/tests/parser.rs
// ============================================================================
// Module: Parser Tests
// Description: Syntax tree coverage for causal-language programs.
// Purpose: Pin rule structure, argument forms, conditions, and limits.
// Dependencies: causal_lang::parser, causal_lang::ast
// ============================================================================
//! ## Overview
//! Integration tests for [`causal_lang::parse_program`] and
//! [`causal_lang::parse_program_with_limits`], including the canonical
//! blocks program shipped in `demos/`.

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
use causal_lang::ParseLimits;
use causal_lang::ast::Arg;
use causal_lang::ast::CompareOp;
use causal_lang::ast::Condition;
use causal_lang::ast::LogicalOp;
use causal_lang::ast::Operand;
use causal_lang::ast::Predicate;
use causal_lang::line_column;
use causal_lang::parse_program;
use causal_lang::parse_program_with_limits;
use serde_json::json;
use support::TestResult;
use support::ensure;

const DEMO: &str = include_str!("../../../demos/causes.txt");

// ============================================================================
// SECTION: Programs
// ============================================================================

/// Tests the canonical blocks program parses into four rules.
#[test]
fn test_demo_program_structure() -> TestResult {
    let program = parse_program(DEMO)?;
    ensure(program.rules.len() == 4, "demo has four rules")?;
    ensure(program.max_effects() == 2, "largest rule has two effects")?;

    let names: Vec<&str> = program.rules.iter().map(|rule| rule.intention.name.as_str()).collect();
    ensure(names == ["move-to", "stack", "stack", "stack-all"], format!("names {names:?}"))?;

    let first = &program.rules[0];
    ensure(first.condition.is_none(), "first rule is unconditional")?;
    ensure(first.effects[1].args.len() == 6, "release has six arguments")?;

    let recursive = &program.rules[2];
    ensure(
        recursive.intention.args.last() == Some(&Arg::Continuation {
            offset: 2,
        }),
        "intention ends in CONT2",
    )?;
    let inner = &recursive.effects[1];
    ensure(
        inner.args.get(3)
            == Some(&Arg::Number(causal_lang::ast::Number {
                negative: false,
                integer: String::new(),
                fraction: Some("5".to_string()),
            })),
        "`.5` parses as a number with an empty integer part",
    )?;
    Ok(())
}

/// Tests trailing semicolons and empty argument lists.
#[test]
fn test_trailing_semicolon_and_empty_arguments() -> TestResult {
    let program = parse_program("RULES { wait() := idle(); }")?;
    ensure(program.rules.len() == 1, "one rule")?;
    ensure(program.rules[0].intention.args.is_empty(), "empty intention args")?;
    ensure(program.rules[0].effects[0].args.is_empty(), "empty effect args")?;
    Ok(())
}

/// Tests literal forms: underscores become spaces only inside quotes.
#[test]
fn test_literals_and_variables() -> TestResult {
    let program = parse_program("RULES { m(big_box) := put(big_box, 'big_box', '0.25', -3) }")?;
    let args = &program.rules[0].effects[0].args;
    ensure(args[0] == Arg::Variable("big_box".to_string()), "variable keeps underscore")?;
    ensure(args[1] == Arg::Literal("big box".to_string()), "literal underscore becomes space")?;
    ensure(args[2] == Arg::Literal("0.25".to_string()), "quoted number keeps its digits")?;
    let Arg::Number(number) = &args[3] else {
        return Err("expected a number".into());
    };
    ensure(number.to_string() == "-3", "negative integer")?;
    Ok(())
}

/// Tests `STATE(...)` and inline python arguments.
#[test]
fn test_state_and_python_arguments() -> TestResult {
    let program = parse_program("RULES { m(a) := f(STATE(a, 'on'), PYTHON(#len(a)#)) }")?;
    let args = &program.rules[0].effects[0].args;
    ensure(
        args[0]
            == Arg::State(vec![Arg::Variable("a".to_string()), Arg::Literal("on".to_string())]),
        "STATE captures its arguments",
    )?;
    ensure(args[1] == Arg::Python("len(a)".to_string()), "python is verbatim")?;
    Ok(())
}

/// Tests the JSON shape the syntax tree serializes to.
#[test]
fn test_program_json_shape() -> TestResult {
    let program =
        parse_program("RULES { if (TYPE(x) != 'red_block'): m(x) := f(x, .5, CONT) }")?;
    let tree = serde_json::to_value(&program)?;
    let rule = &tree["rules"][0];

    ensure(rule["intention"]["name"] == json!("m"), format!("got {rule}"))?;
    ensure(rule["intention"]["args"] == json!([{ "variable": "x" }]), format!("got {rule}"))?;
    ensure(
        rule["effects"][0]["args"]
            == json!([
                { "variable": "x" },
                { "number": { "negative": false, "integer": "", "fraction": "5" } },
                { "continuation": { "offset": 1 } }
            ]),
        format!("got {rule}"),
    )?;

    let compare = &rule["condition"]["compare"]["compare"];
    ensure(compare["left"] == json!({ "type": "x" }), format!("got {compare}"))?;
    ensure(compare["op"] == json!("not_eq"), format!("got {compare}"))?;
    ensure(
        compare["right"] == json!({ "value": { "literal": "red block" } }),
        format!("got {compare}"),
    )?;
    ensure(compare["position"] == json!(12), format!("got {compare}"))?;
    Ok(())
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Tests comparison operators, operands, and grouping.
#[test]
fn test_condition_forms() -> TestResult {
    let program = parse_program(
        "RULES { if ((TYPE(x) != 'block') && ALL(block) = [x, CONT] || ready): m(x) := f(x) }",
    )?;
    let Some(Condition::Logical {
        left,
        op: LogicalOp::And,
        right,
    }) = &program.rules[0].condition
    else {
        return Err("expected an && chain".into());
    };
    let Condition::Group(group) = left.as_ref() else {
        return Err("expected a group on the left".into());
    };
    ensure(
        matches!(
            group.as_ref(),
            Condition::Compare(Predicate::Compare {
                left: Operand::Type(_),
                op: CompareOp::NotEq,
                ..
            })
        ),
        "group holds a TYPE comparison",
    )?;
    let Condition::Logical {
        left: all,
        op: LogicalOp::Or,
        right: bare,
    } = right.as_ref()
    else {
        return Err("expected the || to nest to the right".into());
    };
    ensure(
        matches!(
            all.as_ref(),
            Condition::Compare(Predicate::Compare {
                left: Operand::All(_),
                right: Operand::List(_),
                ..
            })
        ),
        "ALL compared with a list",
    )?;
    ensure(
        matches!(
            bare.as_ref(),
            Condition::Compare(Predicate::Bare {
                operand: Operand::Value(Arg::Variable(_)),
                ..
            })
        ),
        "bare predicate",
    )?;
    Ok(())
}

/// Tests that continuations in conditions must sit inside lists.
#[test]
fn test_condition_continuation_outside_list_is_rejected() -> TestResult {
    let err = parse_program("RULES { if (x = CONT): m(x) := f(x) }").unwrap_err();
    ensure(matches!(err, ParseError::InvalidContinuation { .. }), format!("got {err}"))?;
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tests error positions map to line and column.
#[test]
fn test_errors_carry_positions() -> TestResult {
    let source = "RULES {\n  m(a) := f(a)\n  g(b) := h(b)\n}";
    let err = parse_program(source).unwrap_err();
    let position = err.position().ok_or("missing position")?;
    ensure(line_column(source, position) == (3, 3), format!("got {err}"))?;

    let err = parse_program("RULES { m() := f() } extra").unwrap_err();
    ensure(matches!(err, ParseError::TrailingInput { position: 21 }), format!("got {err}"))?;

    let err = parse_program("RULES { }").unwrap_err();
    ensure(matches!(err, ParseError::UnexpectedToken { .. }), "empty rule set is rejected")?;
    Ok(())
}

/// Tests continuation offsets are bounded by the preceding arguments.
#[test]
fn test_continuation_offsets() -> TestResult {
    ensure(parse_program("RULES { m(a, b, CONT2) := f(a, b) }").is_ok(), "CONT2 after two")?;
    let err = parse_program("RULES { m(a, CONT2) := f(a) }").unwrap_err();
    ensure(matches!(err, ParseError::InvalidContinuation { .. }), "CONT2 after one")?;
    let err = parse_program("RULES { m(CONT) := f() }").unwrap_err();
    ensure(matches!(err, ParseError::InvalidContinuation { .. }), "CONT first")?;
    let err = parse_program("RULES { m(a, CONT0) := f(a) }").unwrap_err();
    ensure(matches!(err, ParseError::InvalidContinuation { .. }), "CONT0")?;
    Ok(())
}

/// Tests configured size and nesting limits.
#[test]
fn test_limits_fail_closed() -> TestResult {
    let tight = ParseLimits {
        max_input_bytes: 16,
        max_nesting: 2,
    };
    let err = parse_program_with_limits(DEMO, tight).unwrap_err();
    ensure(matches!(err, ParseError::InputTooLarge { max_bytes: 16, .. }), format!("got {err}"))?;

    let nested = "RULES { if ((((a = 1)))): m(a) := f(a) }";
    let shallow = ParseLimits {
        max_nesting: 2,
        ..ParseLimits::default()
    };
    let err = parse_program_with_limits(nested, shallow).unwrap_err();
    ensure(matches!(err, ParseError::NestingTooDeep { max_depth: 2, .. }), format!("got {err}"))?;
    ensure(parse_program(nested).is_ok(), "default nesting accepts three groups")?;
    Ok(())
}
