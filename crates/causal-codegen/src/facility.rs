// crates/causal-codegen/src/facility.rs
// ============================================================================
// Module: Facility Domain Emitter
// Description: Renders the CO-PCT `causes` body and `M` for a program.
// Purpose: Let CO-PCT explain demonstrations with the authored rules.
// Dependencies: causal-lang, tracing
// ============================================================================

//! ## Overview
//! Each rule becomes one `if actions == (...)` block inside `causes(v)`.
//! Variables are located by position in the observed effects: a variable
//! maps to `arguments[i][j]`, the `j`th argument of effect `i`, with later
//! occurrences taking precedence. A rendered block looks like:
//!
//! ```text
//!     if actions == ('move-to',):
//!         obj_type = lookup_type(arguments[0][0], states[0])
//!         if obj_type == 'block':
//!             g.add((states[0],'stack',(arguments[0][1], )+(arguments[0][0], )))
//! ```
//!
//! `M` is the largest number of effects in any rule.

use std::collections::HashMap;

use causal_lang::Program;
use causal_lang::ast::Action;
use causal_lang::ast::Arg;
use causal_lang::ast::CompareOp;
use causal_lang::ast::Condition;
use causal_lang::ast::Operand;
use causal_lang::ast::Predicate;
use causal_lang::ast::Rule;
use tracing::debug;

use crate::error::CodegenError;
use crate::python::INDENT;
use crate::python::python_constant;
use crate::python::python_ident;
use crate::python::python_str;

/// Target name used in diagnostics.
const TARGET: &str = "facility";

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Output of the facility emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityDomain {
    /// Body of `causes(v)`, indented for the function.
    pub causes: String,
    /// Value for `M`: the largest effect count of any rule.
    pub max_effects: usize,
}

/// Emits the facility domain for a program.
///
/// # Errors
/// Returns [`CodegenError`] when an intention or condition uses a variable
/// that appears in no effect, or uses a construct CO-PCT cannot express.
pub fn compile_facility(program: &Program) -> Result<FacilityDomain, CodegenError> {
    let mut causes = String::new();
    for (index, rule) in program.rules.iter().enumerate() {
        debug!(rule = index, intention = %rule.intention.name, "emitting facility rule");
        render_rule(&mut causes, rule)?;
    }
    Ok(FacilityDomain {
        causes,
        max_effects: program.max_effects(),
    })
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Appends the block for one rule.
fn render_rule(out: &mut String, rule: &Rule) -> Result<(), CodegenError> {
    let index = ArgumentIndex::build(&rule.effects);

    out.push_str(INDENT);
    out.push_str("if actions == (");
    for effect in &rule.effects {
        out.push_str(&python_str(&effect.name));
        out.push(',');
    }
    out.push_str("):\n");

    let intention = render_pieces(&rule.intention.args, &index, rule.intention.position)?;
    let add = format!(
        "g.add((states[0],{},{intention}))\n",
        python_str(&rule.intention.name)
    );

    match &rule.condition {
        None => {
            out.push_str(INDENT);
            out.push_str(INDENT);
            out.push_str(&add);
        }
        Some(condition) => {
            let mut setup = Vec::new();
            let test = render_condition(condition, &index, &mut setup)?;
            for line in setup {
                out.push_str(INDENT);
                out.push_str(INDENT);
                out.push_str(&line);
                out.push('\n');
            }
            out.push_str(INDENT);
            out.push_str(INDENT);
            out.push_str("if ");
            out.push_str(&test);
            out.push_str(":\n");
            out.push_str(INDENT);
            out.push_str(INDENT);
            out.push_str(INDENT);
            out.push_str(&add);
        }
    }
    Ok(())
}

/// Maps each variable to the effect argument it was observed at.
struct ArgumentIndex<'a> {
    /// Variable name to `(effect, argument)`.
    slots: HashMap<&'a str, (usize, usize)>,
}

impl<'a> ArgumentIndex<'a> {
    /// Indexes every variable in the effects; later occurrences win.
    fn build(effects: &'a [Action]) -> Self {
        let mut slots = HashMap::new();
        for (i, effect) in effects.iter().enumerate() {
            for (j, arg) in effect.args.iter().enumerate() {
                if let Some(name) = arg.as_variable() {
                    slots.insert(name, (i, j));
                }
            }
        }
        Self {
            slots,
        }
    }

    /// Looks up a variable.
    fn slot(&self, name: &str, position: usize) -> Result<(usize, usize), CodegenError> {
        self.slots.get(name).copied().ok_or_else(|| CodegenError::UnknownArgument {
            name: name.to_string(),
            position,
        })
    }
}

/// Renders arguments as a concatenation of 1-tuples and slices.
fn render_pieces(
    args: &[Arg],
    index: &ArgumentIndex<'_>,
    position: usize,
) -> Result<String, CodegenError> {
    let mut pieces: Vec<String> = Vec::with_capacity(args.len());
    let mut previous = None;
    for arg in args {
        match arg {
            Arg::Variable(name) => {
                let (i, j) = index.slot(name, position)?;
                pieces.push(format!("(arguments[{i}][{j}], )"));
                previous = Some((i, j));
            }
            Arg::Literal(_) | Arg::Number(_) => {
                if let Some(constant) = python_constant(arg) {
                    pieces.push(format!("({constant}, )"));
                }
                previous = None;
            }
            Arg::Continuation {
                ..
            } => {
                let Some((i, j)) = previous.take() else {
                    return Err(CodegenError::InvalidContinuation {
                        reason: "continuation must follow a variable",
                        position,
                    });
                };
                pieces.pop();
                pieces.push(format!("arguments[{i}][{j}:]"));
            }
            Arg::State(_) => {
                return Err(unsupported("STATE(...) argument", position));
            }
            Arg::Python(_) => {
                return Err(unsupported("inline python argument", position));
            }
        }
    }
    if pieces.is_empty() { Ok("()".to_string()) } else { Ok(pieces.join("+")) }
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Renders a condition as a Python test, collecting setup lines.
fn render_condition(
    condition: &Condition,
    index: &ArgumentIndex<'_>,
    setup: &mut Vec<String>,
) -> Result<String, CodegenError> {
    match condition {
        Condition::Compare(predicate) => render_predicate(predicate, index, setup),
        Condition::Group(inner) => Ok(format!("({})", render_condition(inner, index, setup)?)),
        Condition::Logical {
            left,
            op,
            right,
        } => {
            let left = render_condition(left, index, setup)?;
            let right = render_condition(right, index, setup)?;
            Ok(format!("{left} {} {right}", op.python()))
        }
    }
}

/// Renders one predicate.
fn render_predicate(
    predicate: &Predicate,
    index: &ArgumentIndex<'_>,
    setup: &mut Vec<String>,
) -> Result<String, CodegenError> {
    match predicate {
        Predicate::Bare {
            operand: Operand::Value(Arg::Python(code)),
            ..
        } => Ok(code.clone()),
        Predicate::Bare {
            position, ..
        } => Err(unsupported("operand without a comparison", *position)),
        Predicate::Compare {
            left,
            op,
            right,
            position,
        } => match (left, right) {
            (Operand::All(type_name), Operand::List(items))
            | (Operand::List(items), Operand::All(type_name)) => {
                if *op != CompareOp::Eq {
                    return Err(unsupported("ALL(...) with an operator other than `=`", *position));
                }
                let all = format!("all_{}", python_ident(type_name));
                push_setup(
                    setup,
                    format!(
                        "{all} = [obj_id for (obj_id, obj_type,_,_,_,_) in states[0] if obj_type \
                         == {}]",
                        python_str(type_name)
                    ),
                );
                let members = render_pieces(items, index, *position)?;
                Ok(format!("set({all}) == set({members})"))
            }
            (Operand::All(_), _) | (_, Operand::All(_)) => {
                Err(unsupported("ALL(...) compared with anything but a list", *position))
            }
            (Operand::List(_), _) | (_, Operand::List(_)) => {
                Err(unsupported("list outside an ALL(...) comparison", *position))
            }
            (Operand::Value(left_arg), Operand::Value(right_arg))
                if python_constant(left_arg).is_some() && python_constant(right_arg).is_some() =>
            {
                Err(unsupported("comparison between two constants", *position))
            }
            _ => {
                let left = render_operand(left, index, setup, *position)?;
                let right = render_operand(right, index, setup, *position)?;
                Ok(format!("{left} {} {right}", op.python()))
            }
        },
    }
}

/// Renders a scalar operand.
fn render_operand(
    operand: &Operand,
    index: &ArgumentIndex<'_>,
    setup: &mut Vec<String>,
    position: usize,
) -> Result<String, CodegenError> {
    match operand {
        Operand::Value(Arg::Variable(name)) => {
            let (i, j) = index.slot(name, position)?;
            Ok(format!("arguments[{i}][{j}]"))
        }
        Operand::Value(Arg::Python(code)) => Ok(code.clone()),
        Operand::Value(arg @ (Arg::Literal(_) | Arg::Number(_))) => {
            python_constant(arg).ok_or_else(|| unsupported("constant", position))
        }
        Operand::Value(Arg::State(_)) => Err(unsupported("STATE(...) in a condition", position)),
        Operand::Value(Arg::Continuation {
            ..
        }) => Err(CodegenError::InvalidContinuation {
            reason: "continuation outside a list",
            position,
        }),
        Operand::Type(name) => {
            let (i, j) = index.slot(name, position)?;
            let variable = format!("{}_type", python_ident(name));
            push_setup(
                setup,
                format!("{variable} = lookup_type(arguments[{i}][{j}], states[0])"),
            );
            Ok(variable)
        }
        Operand::All(_) | Operand::List(_) => Err(unsupported("collection operand", position)),
    }
}

/// Adds a setup line once.
fn push_setup(setup: &mut Vec<String>, line: String) {
    if !setup.contains(&line) {
        setup.push(line);
    }
}

/// Builds an unsupported-construct error for this target.
const fn unsupported(construct: &'static str, position: usize) -> CodegenError {
    CodegenError::Unsupported {
        construct,
        target: TARGET,
        position,
    }
}
