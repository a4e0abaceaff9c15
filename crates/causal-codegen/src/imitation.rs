// crates/causal-codegen/src/imitation.rs
// ============================================================================
// Module: Imitation Emitter
// Description: Renders pyhop HTN methods that decompose each intention.
// Purpose: Let the planner replay inferred intentions as concrete actions.
// Dependencies: causal-lang, tracing
// ============================================================================

//! ## Overview
//! Rules sharing an intention name become one pyhop method, in order of first
//! appearance. Parameters come from the first rule; a trailing `CONTn` in any
//! rule's intention turns the tail into a `*name` parameter. Each rule then
//! contributes a guarded `return`:
//!
//! ```text
//! def stack(state, dest, dx, dy, dz, da, *obj):
//!     obj = flatten(obj)
//!     if state.objs[obj[0]][0] == 'block':
//!         __ret_val = [('move-to',obj[0],dest,dx,dy,dz,da)]
//!         ...
//! pyhop.declare_methods('stack',stack)
//! ```
//!
//! Conditions are evaluated in two passes. The first binds variables the
//! intention does not supply: `ALL(t) = [a, b, CONT]` binds list members to
//! `all_t[i]`, `v = 'x'` binds an unbound `v` to a constant, and `a = b`
//! aliases whichever side is unbound. The second pass renders everything
//! that is left as the rule's test, or `True` when nothing is.
//!
//! With more than one rule, each return is additionally guarded by a check
//! that every intention argument is used by the decomposition.

use std::collections::HashMap;
use std::collections::HashSet;

use causal_lang::Program;
use causal_lang::ast::Action;
use causal_lang::ast::Arg;
use causal_lang::ast::CompareOp;
use causal_lang::ast::Condition;
use causal_lang::ast::LogicalOp;
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
const TARGET: &str = "imitation";

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Emits pyhop methods for every intention in the program.
///
/// # Errors
/// Returns [`CodegenError`] when rules for an intention disagree on their
/// parameters, an effect uses a variable nothing binds, a binding appears
/// under `||`, or a construct has no pyhop rendering.
pub fn compile_imitation(program: &Program) -> Result<String, CodegenError> {
    let methods = group_methods(program)?;
    let mut out = String::new();
    for method in &methods {
        debug!(
            intention = method.name,
            function = %method.function,
            rules = method.rules.len(),
            "emitting imitation method"
        );
        render_method(&mut out, method)?;
    }
    Ok(out)
}

// ============================================================================
// SECTION: Methods
// ============================================================================

/// Rules sharing one intention.
struct Method<'a> {
    /// Intention name as written.
    name: &'a str,
    /// Python function name.
    function: String,
    /// Rules in source order; never empty.
    rules: Vec<&'a Rule>,
}

/// Groups rules by intention in first-appearance order.
fn group_methods(program: &Program) -> Result<Vec<Method<'_>>, CodegenError> {
    let mut methods: Vec<Method<'_>> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut by_function: HashMap<String, &str> = HashMap::new();
    for rule in &program.rules {
        let name = rule.intention.name.as_str();
        if let Some(&slot) = by_name.get(name) {
            methods[slot].rules.push(rule);
            continue;
        }
        let function = python_ident(name);
        if let Some(first) = by_function.get(&function) {
            return Err(CodegenError::DuplicateMethod {
                function,
                first: (*first).to_string(),
                second: name.to_string(),
            });
        }
        by_function.insert(function.clone(), name);
        by_name.insert(name, methods.len());
        methods.push(Method {
            name,
            function,
            rules: vec![rule],
        });
    }
    Ok(methods)
}

/// Parameter layout shared by every rule of a method.
struct Signature {
    /// Python names of the fixed parameters.
    fixed: Vec<String>,
    /// Python name of the variadic parameter, if any.
    star: Option<String>,
}

impl Signature {
    /// Derives the signature from the method's rules.
    fn build(method: &Method<'_>) -> Result<Self, CodegenError> {
        let mut start: Option<usize> = None;
        for rule in &method.rules {
            let (params, continuation) = intention_params(method, rule)?;
            check_unique(method, rule, &params)?;
            if let Some(offset) = continuation {
                let k = params.len().saturating_sub(offset);
                match start {
                    Some(existing) if existing != k => {
                        return Err(inconsistent(
                            method,
                            rule,
                            format!(
                                "continuation starts at parameter {k}, earlier rules start at \
                                 {existing}"
                            ),
                        ));
                    }
                    _ => start = Some(k),
                }
            }
        }

        let first = method.rules[0];
        let (first_params, _) = intention_params(method, first)?;
        match start {
            Some(k) => {
                for rule in &method.rules {
                    let (params, _) = intention_params(method, rule)?;
                    if params.len() <= k {
                        return Err(inconsistent(
                            method,
                            rule,
                            format!("expected at least {} parameters", k + 1),
                        ));
                    }
                }
                Ok(Self {
                    fixed: first_params[.. k].iter().map(|name| python_ident(name)).collect(),
                    star: Some(python_ident(first_params[k])),
                })
            }
            None => {
                for rule in &method.rules {
                    let (params, _) = intention_params(method, rule)?;
                    if params.len() != first_params.len() {
                        return Err(inconsistent(
                            method,
                            rule,
                            format!(
                                "expected {} parameters, found {}",
                                first_params.len(),
                                params.len()
                            ),
                        ));
                    }
                }
                Ok(Self {
                    fixed: first_params.iter().map(|name| python_ident(name)).collect(),
                    star: None,
                })
            }
        }
    }

    /// Binding for intention parameter `index` of any rule.
    fn binding(&self, index: usize) -> Binding {
        match &self.star {
            Some(star) if index >= self.fixed.len() => Binding::Element {
                seq: star.clone(),
                index: index - self.fixed.len(),
            },
            _ => Binding::Param(self.fixed.get(index).cloned().unwrap_or_default()),
        }
    }

    /// Renders the `def` line.
    fn render_def(&self, function: &str) -> String {
        let mut line = format!("def {function}(state");
        for param in &self.fixed {
            line.push_str(", ");
            line.push_str(param);
        }
        if let Some(star) = &self.star {
            line.push_str(", *");
            line.push_str(star);
        }
        line.push_str("):\n");
        line
    }

    /// Renders the list of intention arguments used by the reduction check.
    fn render_intention_args(&self) -> String {
        let mut items: Vec<String> = self.fixed.iter().map(|param| format!("[{param}]")).collect();
        if let Some(star) = &self.star {
            items.push(format!("[__obj for __obj in {star}]"));
        }
        format!("[{}]", items.join(","))
    }
}

/// Returns an intention's variable parameters and trailing continuation.
fn intention_params<'r>(
    method: &Method<'_>,
    rule: &'r Rule,
) -> Result<(Vec<&'r str>, Option<usize>), CodegenError> {
    let mut params = Vec::with_capacity(rule.intention.args.len());
    let mut continuation = None;
    for arg in &rule.intention.args {
        match arg {
            Arg::Variable(name) => params.push(name.as_str()),
            Arg::Continuation {
                offset,
            } => {
                continuation = Some(usize::try_from(*offset).unwrap_or(usize::MAX));
            }
            _ => {
                return Err(inconsistent(
                    method,
                    rule,
                    "intention parameters must be variables".to_string(),
                ));
            }
        }
    }
    Ok((params, continuation))
}

/// Rejects intentions that repeat a parameter name.
fn check_unique(method: &Method<'_>, rule: &Rule, params: &[&str]) -> Result<(), CodegenError> {
    let mut seen = HashSet::new();
    for param in params {
        if !seen.insert(*param) {
            return Err(inconsistent(method, rule, format!("parameter `{param}` repeats")));
        }
    }
    Ok(())
}

/// Appends one method.
fn render_method(out: &mut String, method: &Method<'_>) -> Result<(), CodegenError> {
    let signature = Signature::build(method)?;
    out.push_str(&signature.render_def(&method.function));
    if let Some(star) = &signature.star {
        out.push_str(INDENT);
        out.push_str(&format!("{star} = flatten({star})\n"));
    }
    let reduction = (method.rules.len() > 1).then(|| signature.render_intention_args());
    for rule in &method.rules {
        render_rule(out, rule, &signature, reduction.as_deref())?;
    }
    out.push_str(&format!(
        "pyhop.declare_methods({},{})\n",
        python_str(method.name),
        method.function
    ));
    Ok(())
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Python expression a variable stands for inside one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    /// Method parameter.
    Param(String),
    /// Element of a sequence, e.g. `obj[1]`.
    Element {
        /// Sequence expression.
        seq: String,
        /// Index into it.
        index: usize,
    },
    /// Rendered constant.
    Constant(String),
}

impl Binding {
    /// Renders the binding as a Python expression.
    fn render(&self) -> String {
        match self {
            Self::Param(name) | Self::Constant(name) => name.clone(),
            Self::Element {
                seq,
                index,
            } => format!("{seq}[{index}]"),
        }
    }
}

/// How pass two treats a predicate consumed by pass one.
enum Rewrite {
    /// Predicate only bound variables.
    Drop,
    /// Predicate bound variables and still needs this test.
    Replace(String),
}

/// Variable scope and condition rewrites for one rule.
struct RuleScope {
    /// Source variable name to binding.
    bindings: HashMap<String, Binding>,
    /// Setup lines emitted before the test.
    setup: Vec<String>,
    /// Predicate position to rewrite.
    rewrites: HashMap<usize, Rewrite>,
}

impl RuleScope {
    /// Binds intention parameters positionally.
    fn new(rule: &Rule, signature: &Signature) -> Self {
        let mut bindings = HashMap::new();
        let variables = rule.intention.args.iter().filter_map(Arg::as_variable);
        for (index, name) in variables.enumerate() {
            bindings.insert(name.to_string(), signature.binding(index));
        }
        Self {
            bindings,
            setup: Vec::new(),
            rewrites: HashMap::new(),
        }
    }

    /// Resolves a variable.
    fn resolve(&self, name: &str, position: usize) -> Result<&Binding, CodegenError> {
        self.bindings.get(name).ok_or_else(|| CodegenError::UnboundVariable {
            name: name.to_string(),
            position,
        })
    }

    /// Adds a new binding, rejecting it under `||`.
    fn bind(
        &mut self,
        name: &str,
        binding: Binding,
        under_or: bool,
        position: usize,
    ) -> Result<(), CodegenError> {
        if under_or {
            return Err(CodegenError::BindingUnderOr {
                name: name.to_string(),
                position,
            });
        }
        self.bindings.insert(name.to_string(), binding);
        Ok(())
    }
}

/// Appends the guarded return for one rule.
fn render_rule(
    out: &mut String,
    rule: &Rule,
    signature: &Signature,
    reduction: Option<&str>,
) -> Result<(), CodegenError> {
    let mut scope = RuleScope::new(rule, signature);
    let test = match &rule.condition {
        Some(condition) => {
            collect_bindings(condition, false, &mut scope)?;
            Some(render_condition(condition, &scope)?.unwrap_or_else(|| "True".to_string()))
        }
        None => None,
    };

    let mut effects = Vec::with_capacity(rule.effects.len());
    for effect in &rule.effects {
        effects.push(render_effect(effect, &scope)?);
    }

    for line in &scope.setup {
        out.push_str(INDENT);
        out.push_str(line);
        out.push('\n');
    }
    let body = match test {
        Some(test) => {
            out.push_str(INDENT);
            out.push_str(&format!("if {test}:\n"));
            INDENT.repeat(2)
        }
        None => INDENT.to_string(),
    };

    out.push_str(&format!("{body}__ret_val = [{}]\n", effects.join(",")));
    match reduction {
        Some(intention_args) => {
            out.push_str(&format!("{body}__all_args = []\n"));
            out.push_str(&format!("{body}for __action in __ret_val:\n"));
            out.push_str(&format!("{body}{INDENT}for __arg in __action:\n"));
            out.push_str(&format!("{body}{INDENT}{INDENT}__all_args.append(__arg)\n"));
            out.push_str(&format!("{body}__all_intention_args = {intention_args}\n"));
            out.push_str(&format!(
                "{body}__all_intention_args = flatten(__all_intention_args)\n"
            ));
            out.push_str(&format!("{body}__all_args = flatten(__all_args)\n"));
            out.push_str(&format!(
                "{body}if set(__all_intention_args).issubset(set(__all_args)):\n"
            ));
            out.push_str(&format!("{body}{INDENT}return __ret_val\n"));
        }
        None => out.push_str(&format!("{body}return __ret_val\n")),
    }
    Ok(())
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Pass one: records bindings and marks the predicates that made them.
fn collect_bindings(
    condition: &Condition,
    under_or: bool,
    scope: &mut RuleScope,
) -> Result<(), CodegenError> {
    match condition {
        Condition::Compare(predicate) => bind_predicate(predicate, under_or, scope),
        Condition::Group(inner) => collect_bindings(inner, under_or, scope),
        Condition::Logical {
            left,
            right,
            ..
        } => {
            let under_or = under_or || chain_has_or(condition);
            collect_bindings(left, under_or, scope)?;
            collect_bindings(right, under_or, scope)
        }
    }
}

/// True when a flat `&&`/`||` chain contains `||` anywhere along it.
fn chain_has_or(condition: &Condition) -> bool {
    let mut current = condition;
    while let Condition::Logical {
        op,
        right,
        ..
    } = current
    {
        if *op == LogicalOp::Or {
            return true;
        }
        current = right;
    }
    false
}

/// Applies pass one to a single predicate.
fn bind_predicate(
    predicate: &Predicate,
    under_or: bool,
    scope: &mut RuleScope,
) -> Result<(), CodegenError> {
    let Predicate::Compare {
        left,
        op,
        right,
        position,
    } = predicate
    else {
        return Ok(());
    };
    let position = *position;
    match (left, right) {
        (Operand::All(type_name), Operand::List(items))
        | (Operand::List(items), Operand::All(type_name)) => {
            if *op != CompareOp::Eq {
                return Err(unsupported("ALL(...) with an operator other than `=`", position));
            }
            bind_all(type_name, items, under_or, position, scope)
        }
        (Operand::All(_), _) | (_, Operand::All(_)) => {
            Err(unsupported("ALL(...) compared with anything but a list", position))
        }
        (Operand::Value(Arg::Variable(a)), Operand::Value(Arg::Variable(b)))
            if *op == CompareOp::Eq =>
        {
            let known_a = scope.bindings.get(a).cloned();
            let known_b = scope.bindings.get(b).cloned();
            match (known_a, known_b) {
                (Some(_), Some(_)) => Ok(()),
                (Some(binding), None) => {
                    scope.bind(b, binding, under_or, position)?;
                    scope.rewrites.insert(position, Rewrite::Drop);
                    Ok(())
                }
                (None, Some(binding)) => {
                    scope.bind(a, binding, under_or, position)?;
                    scope.rewrites.insert(position, Rewrite::Drop);
                    Ok(())
                }
                (None, None) => Err(CodegenError::UnboundVariables {
                    left: a.clone(),
                    right: b.clone(),
                    position,
                }),
            }
        }
        (Operand::Value(Arg::Variable(name)), Operand::Value(constant))
        | (Operand::Value(constant), Operand::Value(Arg::Variable(name)))
            if *op == CompareOp::Eq && !scope.bindings.contains_key(name) =>
        {
            let Some(rendered) = python_constant(constant) else {
                return Ok(());
            };
            scope.bind(name, Binding::Constant(rendered), under_or, position)?;
            scope.rewrites.insert(position, Rewrite::Drop);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Binds `ALL(type) = [items]` members to elements of `all_type`.
fn bind_all(
    type_name: &str,
    items: &[Arg],
    under_or: bool,
    position: usize,
    scope: &mut RuleScope,
) -> Result<(), CodegenError> {
    let all = format!("all_{}", python_ident(type_name));
    let id = format!("{}_id", python_ident(type_name));
    let line = format!(
        "{all} = [{id} for {id} in state.objs if state.objs[{id}][0]=={}]",
        python_str(type_name)
    );
    if !scope.setup.contains(&line) {
        scope.setup.push(line);
    }

    let mut checks = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let element = Binding::Element {
            seq: all.clone(),
            index,
        };
        match item {
            Arg::Variable(name) => match scope.bindings.get(name) {
                Some(existing) => {
                    checks.push(format!("{} == {}", element.render(), existing.render()));
                }
                None => scope.bind(name, element, under_or, position)?,
            },
            Arg::Continuation {
                ..
            } => {}
            Arg::Literal(_) | Arg::Number(_) => {
                if let Some(constant) = python_constant(item) {
                    checks.push(format!("{} == {constant}", element.render()));
                }
            }
            Arg::State(_) | Arg::Python(_) => {
                return Err(unsupported("ALL(...) list member", position));
            }
        }
    }
    if items.is_empty() {
        checks.push(format!("len({all}) == 0"));
    }
    let rewrite =
        if checks.is_empty() { Rewrite::Drop } else { Rewrite::Replace(checks.join(" and ")) };
    scope.rewrites.insert(position, rewrite);
    Ok(())
}

/// Pass two: renders what is left of the condition, or `None` if nothing is.
fn render_condition(
    condition: &Condition,
    scope: &RuleScope,
) -> Result<Option<String>, CodegenError> {
    match condition {
        Condition::Compare(predicate) => render_predicate(predicate, scope),
        Condition::Group(inner) => {
            Ok(render_condition(inner, scope)?.map(|inner| format!("({inner})")))
        }
        Condition::Logical {
            left,
            op,
            right,
        } => {
            let left = render_condition(left, scope)?;
            let right = render_condition(right, scope)?;
            Ok(match (left, right) {
                (Some(left), Some(right)) => Some(format!("{left} {} {right}", op.python())),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            })
        }
    }
}

/// Renders one predicate unless pass one consumed it.
fn render_predicate(
    predicate: &Predicate,
    scope: &RuleScope,
) -> Result<Option<String>, CodegenError> {
    match predicate {
        Predicate::Bare {
            operand: Operand::Value(Arg::Python(code)),
            ..
        } => Ok(Some(code.clone())),
        Predicate::Bare {
            position, ..
        } => Err(unsupported("operand without a comparison", *position)),
        Predicate::Compare {
            left,
            op,
            right,
            position,
        } => {
            match scope.rewrites.get(position) {
                Some(Rewrite::Drop) => return Ok(None),
                Some(Rewrite::Replace(test)) => return Ok(Some(test.clone())),
                None => {}
            }
            if let (Operand::Value(left_arg), Operand::Value(right_arg)) = (left, right)
                && python_constant(left_arg).is_some()
                && python_constant(right_arg).is_some()
            {
                return Err(unsupported("comparison between two constants", *position));
            }
            let left = render_operand(left, scope, *position)?;
            let right = render_operand(right, scope, *position)?;
            Ok(Some(format!("{left} {} {right}", op.python())))
        }
    }
}

/// Renders a scalar operand against the rule scope.
fn render_operand(
    operand: &Operand,
    scope: &RuleScope,
    position: usize,
) -> Result<String, CodegenError> {
    match operand {
        Operand::Value(arg) => render_value(arg, scope, position),
        Operand::Type(name) => {
            Ok(format!("state.objs[{}][0]", scope.resolve(name, position)?.render()))
        }
        Operand::All(_) | Operand::List(_) => Err(unsupported("collection operand", position)),
    }
}

// ============================================================================
// SECTION: Effects
// ============================================================================

/// Renders one effect as a tuple, expanding a trailing continuation.
fn render_effect(effect: &Action, scope: &RuleScope) -> Result<String, CodegenError> {
    let position = effect.position;
    let mut out = format!("({}", python_str(&effect.name));
    let Some((Arg::Continuation { offset }, fixed)) = effect.args.split_last() else {
        for arg in &effect.args {
            out.push(',');
            out.push_str(&render_value(arg, scope, position)?);
        }
        if effect.args.is_empty() {
            out.push(',');
        }
        out.push(')');
        return Ok(out);
    };

    let covered = usize::try_from(*offset).unwrap_or(usize::MAX);
    let Some(kept_len) = fixed.len().checked_sub(covered) else {
        return Err(invalid_continuation("continuation reaches before the first argument", position));
    };
    let (kept, tail) = fixed.split_at(kept_len);
    let (seq, start) = tail_start(tail, scope, position)?;
    for arg in kept {
        out.push(',');
        out.push_str(&render_value(arg, scope, position)?);
    }
    out.push_str(&format!(",)+tuple({seq}[{start}:])"));
    Ok(out)
}

/// Checks that the covered arguments are consecutive elements of one
/// sequence and returns that sequence with the first covered index.
fn tail_start(
    tail: &[Arg],
    scope: &RuleScope,
    position: usize,
) -> Result<(String, usize), CodegenError> {
    let mut elements = Vec::with_capacity(tail.len());
    for arg in tail {
        let Arg::Variable(name) = arg else {
            return Err(invalid_continuation("continuation must follow variables", position));
        };
        match scope.resolve(name, position)? {
            Binding::Element {
                seq,
                index,
            } => elements.push((seq.clone(), *index)),
            _ => {
                return Err(invalid_continuation(
                    "continuation must follow elements of a sequence",
                    position,
                ));
            }
        }
    }
    let Some((seq, start)) = elements.first().cloned() else {
        return Err(invalid_continuation("continuation must follow a variable", position));
    };
    let consecutive = elements
        .iter()
        .enumerate()
        .all(|(step, (other, index))| *other == seq && *index == start + step);
    if !consecutive {
        return Err(invalid_continuation(
            "arguments covered by a continuation must be consecutive elements",
            position,
        ));
    }
    Ok((seq, start))
}

/// Renders an argument inside a tuple or test.
fn render_value(arg: &Arg, scope: &RuleScope, position: usize) -> Result<String, CodegenError> {
    match arg {
        Arg::Variable(name) => Ok(scope.resolve(name, position)?.render()),
        Arg::Literal(_) | Arg::Number(_) => {
            python_constant(arg).ok_or_else(|| unsupported("constant", position))
        }
        Arg::Python(code) => Ok(code.clone()),
        Arg::State(_) => Err(unsupported("STATE(...) argument", position)),
        Arg::Continuation {
            ..
        } => Err(invalid_continuation("continuation must be the last argument", position)),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Builds an unsupported-construct error for this target.
const fn unsupported(construct: &'static str, position: usize) -> CodegenError {
    CodegenError::Unsupported {
        construct,
        target: TARGET,
        position,
    }
}

/// Builds a continuation error.
const fn invalid_continuation(reason: &'static str, position: usize) -> CodegenError {
    CodegenError::InvalidContinuation {
        reason,
        position,
    }
}

/// Builds an inconsistent-intention error for a rule.
fn inconsistent(method: &Method<'_>, rule: &Rule, reason: String) -> CodegenError {
    CodegenError::InconsistentIntention {
        intention: method.name.to_string(),
        reason,
        position: rule.intention.position,
    }
}
