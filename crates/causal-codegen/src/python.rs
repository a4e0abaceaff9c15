// crates/causal-codegen/src/python.rs
// ============================================================================
// Module: Python Rendering Helpers
// Description: Identifier and literal rendering shared by both emitters.
// Purpose: Keep generated names valid Python and literals correctly quoted.
// Dependencies: causal-lang
// ============================================================================

//! Python identifier and literal rendering.

use causal_lang::ast::Arg;

/// One indentation level in generated Python.
pub const INDENT: &str = "    ";

/// Names that cannot be used verbatim as generated identifiers: Python
/// keywords plus names the imitation template defines.
const RESERVED_NAMES: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield", "state", "flatten", "pyhop", "copct", "math", "ops",
];

/// Renders a single-quoted Python string literal.
#[must_use]
pub fn python_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Converts a causal-language name into a Python identifier.
///
/// `-` becomes `_`; reserved names gain a trailing `_`.
#[must_use]
pub fn python_ident(name: &str) -> String {
    let mut ident = name.replace('-', "_");
    if RESERVED_NAMES.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Renders a literal or number argument, or `None` for other kinds.
#[must_use]
pub fn python_constant(arg: &Arg) -> Option<String> {
    match arg {
        Arg::Literal(text) => Some(python_str(text)),
        Arg::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
