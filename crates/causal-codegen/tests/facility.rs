// crates/causal-codegen/tests/facility.rs
// ============================================================================
// Module: Facility Emitter Tests
// Description: Golden and error coverage for the CO-PCT facility domain.
// Purpose: Pin the `causes` body and `M` produced for known programs.
// Dependencies: causal_codegen::facility, causal_lang
// ============================================================================
//! ## Overview
//! Integration tests for [`causal_codegen::compile_facility`] against the
//! canonical blocks program and targeted edge cases.

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

use causal_codegen::CodegenError;
use causal_codegen::compile_facility;
use causal_lang::parse_program;
use support::TestResult;
use support::compile_demo;
use support::ensure;

/// Parses `source` and emits its facility domain.
fn facility(source: &str) -> Result<causal_codegen::FacilityDomain, CodegenError> {
    compile_facility(&parse_program(source).unwrap())
}

/// Tests the demo's `causes` body rule by rule.
#[test]
fn test_demo_causes_body() -> TestResult {
    let domain = compile_demo()?.facility_domain()?;
    ensure(domain.max_effects == 2, "M is the largest effect count")?;

    let expected = [
        "    if actions == ('grasp','release',):",
        "        g.add((states[0],'move-to',(arguments[1][0], )+(arguments[1][1], )+(arguments[1][2], \
         )+(arguments[1][3], )+(arguments[1][4], )+(arguments[1][5], )))",
        "    if actions == ('move-to',):",
        "        obj_type = lookup_type(arguments[0][0], states[0])",
        "        if obj_type == 'block':",
        "            g.add((states[0],'stack',(arguments[0][1], )+(arguments[0][2], )+(arguments[0][3], \
         )+(arguments[0][4], )+(arguments[0][5], )+(arguments[0][0], )))",
        "    if actions == ('move-to','stack',):",
        "        obj1_type = lookup_type(arguments[1][0], states[0])",
        "        if obj1_type == 'block' and arguments[0][0] == arguments[1][0]:",
        "            g.add((states[0],'stack',(arguments[0][1], )+(arguments[0][2], )+(arguments[0][3], \
         )+(arguments[0][4], )+(arguments[0][5], )+(arguments[1][0], )+arguments[1][5:]))",
        "    if actions == ('stack',):",
        "        all_block = [obj_id for (obj_id, obj_type,_,_,_,_) in states[0] if obj_type == 'block']",
        "        if set(all_block) == set(arguments[0][5:]) and arguments[0][0] == 'room':",
        "            g.add((states[0],'stack-all',(arguments[0][1], )+(arguments[0][2], \
         )+(arguments[0][3], )+(arguments[0][4], )))",
    ];
    let lines: Vec<&str> = domain.causes.lines().collect();
    ensure(lines == expected, format!("unexpected causes body:\n{}", domain.causes))?;
    Ok(())
}

/// Tests that grouped conditions keep their parentheses.
#[test]
fn test_groups_render_with_parentheses() -> TestResult {
    let domain = facility("RULES { if ((a = 1 || a = 2) && b != 'x'): m(a, b) := f(a, b) }")?;
    ensure(
        domain.causes.contains(
            "if (arguments[0][0] == 1 or arguments[0][0] == 2) and arguments[0][1] != 'x':",
        ),
        format!("got {}", domain.causes),
    )?;
    Ok(())
}

/// Tests inline python conditions pass through verbatim.
#[test]
fn test_python_condition_is_verbatim() -> TestResult {
    let domain = facility("RULES { if (PYTHON(#len(states) > 1#)): m(a) := f(a) }")?;
    ensure(domain.causes.contains("        if len(states) > 1:"), format!("got {}", domain.causes))?;
    Ok(())
}

/// Tests variables missing from every effect are rejected.
#[test]
fn test_unknown_argument_is_rejected() -> TestResult {
    let err = facility("RULES { m(a, ghost) := f(a) }").unwrap_err();
    ensure(
        matches!(err, CodegenError::UnknownArgument { ref name, .. } if name == "ghost"),
        format!("got {err}"),
    )?;
    Ok(())
}

/// Tests constructs the facility target cannot express.
#[test]
fn test_unsupported_constructs() -> TestResult {
    let err = facility("RULES { m(STATE(a)) := f(a) }").unwrap_err();
    ensure(matches!(err, CodegenError::Unsupported { .. }), format!("got {err}"))?;
    let err = facility("RULES { if (1 = 2): m(a) := f(a) }").unwrap_err();
    ensure(matches!(err, CodegenError::Unsupported { .. }), format!("got {err}"))?;
    let err = facility("RULES { if (ALL(block) != [a]): m(a) := f(a) }").unwrap_err();
    ensure(matches!(err, CodegenError::Unsupported { .. }), format!("got {err}"))?;
    Ok(())
}
