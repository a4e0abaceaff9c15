// crates/causal-lang/src/ast.rs
// ============================================================================
// Module: Causal Language AST
// Description: Syntax tree for causal rules, conditions, and arguments.
// Purpose: Give code generators a typed view of a parsed program.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Program`] is an ordered list of [`Rule`]s. Each rule states that a
//! sequence of effect actions causes one intention action, optionally guarded
//! by a [`Condition`]. Positions are byte offsets into the source.
//!
//! ```text
//! if (TYPE(obj) = 'block'):
//!     stack(dest, obj) := move-to(obj, dest)
//! ```

use std::fmt;

use serde::Serialize;

// ============================================================================
// SECTION: Program
// ============================================================================

/// Parsed causal-language program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    /// Rules in source order.
    pub rules: Vec<Rule>,
}

impl Program {
    /// Returns the largest effect count across all rules.
    #[must_use]
    pub fn max_effects(&self) -> usize {
        self.rules.iter().map(|rule| rule.effects.len()).max().unwrap_or(0)
    }
}

/// One causal rule: `[if (condition):] intention := effect, effect, ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Optional guard.
    pub condition: Option<Condition>,
    /// The action explained by the effects.
    pub intention: Action,
    /// Ordered effect actions; never empty.
    pub effects: Vec<Action>,
    /// Byte offset where the rule starts.
    pub position: usize,
}

/// Named action with arguments, e.g. `move-to(obj, dest)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Action name as written.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Arg>,
    /// Byte offset of the action name.
    pub position: usize,
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Argument of an action or operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Arg {
    /// Variable bound by position.
    Variable(String),
    /// Quoted literal; `_` in the source becomes a space.
    Literal(String),
    /// Numeric literal.
    Number(Number),
    /// `CONTn`: the remaining arguments from `n` places back onward.
    Continuation {
        /// How many preceding arguments the marker extends (at least 1).
        offset: u32,
    },
    /// `STATE(...)` reference.
    State(Vec<Arg>),
    /// Inline python copied verbatim.
    Python(String),
}

impl Arg {
    /// Returns the variable name when the argument is a variable.
    #[must_use]
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the continuation offset when the argument is `CONTn`.
    #[must_use]
    pub const fn continuation(&self) -> Option<u32> {
        match self {
            Self::Continuation {
                offset,
            } => Some(*offset),
            _ => None,
        }
    }
}

/// Numeric literal with its digit text preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Number {
    /// Leading `-` present.
    pub negative: bool,
    /// Integer digits; empty for `.5`.
    pub integer: String,
    /// Fraction digits after `.`, if any.
    pub fraction: Option<String>,
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        if self.integer.is_empty() {
            f.write_str("0")?;
        } else {
            f.write_str(&self.integer)?;
        }
        if let Some(fraction) = &self.fraction {
            write!(f, ".{fraction}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Boolean guard of a rule.
///
/// `&&`/`||` chains are right-nested with no precedence between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Single predicate.
    Compare(Predicate),
    /// Parenthesized sub-condition.
    Group(Box<Condition>),
    /// `left op right`.
    Logical {
        /// Left side.
        left: Box<Condition>,
        /// Connective.
        op: LogicalOp,
        /// Right side, itself possibly a chain.
        right: Box<Condition>,
    },
}

/// Logical connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl LogicalOp {
    /// Python spelling of the connective.
    #[must_use]
    pub const fn python(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Leaf of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// `left op right`.
    Compare {
        /// Left operand.
        left: Operand,
        /// Comparison operator.
        op: CompareOp,
        /// Right operand.
        right: Operand,
        /// Byte offset of the left operand.
        position: usize,
    },
    /// Operand used as a test on its own; only inline python is meaningful.
    Bare {
        /// The operand.
        operand: Operand,
        /// Byte offset of the operand.
        position: usize,
    },
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
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
}

impl CompareOp {
    /// Python spelling of the operator.
    #[must_use]
    pub const fn python(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
        }
    }
}

/// Operand of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Plain argument.
    Value(Arg),
    /// `ALL(type)`: every object of the type in the current state.
    All(String),
    /// `TYPE(var)`: the type of the object bound to the variable.
    Type(String),
    /// `[a, b, ...]`
    List(Vec<Arg>),
}
