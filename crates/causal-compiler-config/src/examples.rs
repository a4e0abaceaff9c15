// crates/causal-compiler-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for `causal-compiler.toml`. Every value shown is the
//! default except the commented overrides.

/// Returns a canonical example `causal-compiler.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[output]
dir = "output"
facility_file = "facility_domain.py"
imitation_file = "imitation.py"

[templates]
# facility = "templates/facility_domain.py.tmpl"
# imitation = "templates/imitation.py.tmpl"

[log]
level = "warn"
# file = "log.txt"

[limits]
max_input_bytes = 1048576
max_nesting = 32
"#,
    )
}
