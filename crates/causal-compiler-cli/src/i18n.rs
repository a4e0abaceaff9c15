// crates/causal-compiler-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for CLI output.
// Purpose: Keep every user-facing string in one place.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! The causal compiler CLI routes user-facing strings through a static
//! catalog. Runtime output should be produced with the [`t!`](crate::t)
//! macro.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
/// - `value` is preformatted for display.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// Formatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG: &[(&str, &str)] = &[
    ("main.version", "causal-compiler {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.validate.ok", "Config is valid."),
    ("config.load_failed", "Failed to load config: {error}"),
    ("logging.init_failed", "Failed to initialise logging: {error}"),
    ("input.missing", "Provide --input FILE or --text SOURCE."),
    ("input.text_label", "<text>"),
    ("input.source_kind", "causal program"),
    ("input.output_kind", "generated script"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.text_too_large", "Inline source is {size} bytes (limit {limit})."),
    ("input.not_utf8", "{kind} at {path} is not valid UTF-8."),
    ("diagnostic.located", "{source}:{line}:{column}: {error}"),
    ("diagnostic.plain", "{source}: {error}"),
    ("template.load_failed", "Failed to load {target} template: {error}"),
    ("compile.out_dir_failed", "Failed to create output directory {path}: {error}"),
    ("compile.wrote", "Wrote {target} script to {path}"),
    ("compile.target_failed", "Failed to generate {target} script: {error}"),
    ("compile.write_failed", "Failed to write {path}: {error}"),
    ("check.up_to_date", "{target} script at {path} is up to date"),
    ("check.drift", "{target} script at {path} is out of date"),
    ("check.missing", "{target} script at {path} does not exist"),
    ("tokens.line", "Token({kind}, {value}) @{position}"),
    ("parse.serialize_failed", "Failed to serialise the syntax tree: {error}"),
];

/// Returns the message catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` in the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
