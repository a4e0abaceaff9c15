// crates/causal-codegen/src/compiler.rs
// ============================================================================
// Module: Causal Compiler Facade
// Description: Parse-once entry point that renders either target script.
// Purpose: Give the CLI and tests one object per source program.
// Dependencies: causal-lang, tracing
// ============================================================================

//! ## Overview
//! [`CausalCompiler`] parses a program once; each [`Target`] is then rendered
//! independently so a failure in one does not prevent the other.

use std::fmt;

use causal_lang::ParseLimits;
use causal_lang::Program;
use causal_lang::parse_program_with_limits;
use tracing::debug;
use tracing::info;

use crate::error::CodegenError;
use crate::error::CompileError;
use crate::facility::FacilityDomain;
use crate::facility::compile_facility;
use crate::imitation::compile_imitation;
use crate::template::Templates;

// ============================================================================
// SECTION: Targets
// ============================================================================

/// Script produced by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// CO-PCT facility domain (`causes` and `M`).
    Facility,
    /// pyhop imitation methods.
    Imitation,
}

impl Target {
    /// Every target, in the order they are generated.
    pub const ALL: [Self; 2] = [Self::Facility, Self::Imitation];

    /// Stable lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Facility => "facility",
            Self::Imitation => "imitation",
        }
    }

    /// Default output file name.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Facility => "facility_domain.py",
            Self::Imitation => "imitation.py",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// A parsed program ready to be rendered.
///
/// # Examples
/// ```
/// use causal_codegen::CausalCompiler;
/// use causal_codegen::Target;
/// use causal_codegen::Templates;
/// use causal_lang::ParseLimits;
///
/// let compiler = CausalCompiler::from_source(
///     "RULES { move-to(obj, dest) := grasp(obj), release(obj, dest) }",
///     ParseLimits::default(),
/// )
/// .unwrap();
/// let script = compiler.compile(Target::Imitation, &Templates::builtin()).unwrap();
/// assert!(script.contains("def move_to(state, obj, dest):"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalCompiler {
    /// Parsed program.
    program: Program,
}

impl CausalCompiler {
    /// Lexes and parses source text.
    ///
    /// # Errors
    /// Returns [`CompileError::Parse`] when the source is invalid.
    pub fn from_source(source: &str, limits: ParseLimits) -> Result<Self, CompileError> {
        debug!(bytes = source.len(), "parsing causal program");
        let program = parse_program_with_limits(source, limits)?;
        info!(rules = program.rules.len(), max_effects = program.max_effects(), "parsed program");
        Ok(Self::from_program(program))
    }

    /// Wraps an already parsed program.
    #[must_use]
    pub const fn from_program(program: Program) -> Self {
        Self {
            program,
        }
    }

    /// Returns the parsed program.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Emits the facility domain without a template.
    ///
    /// # Errors
    /// Returns [`CodegenError`] when the program cannot be expressed for CO-PCT.
    pub fn facility_domain(&self) -> Result<FacilityDomain, CodegenError> {
        compile_facility(&self.program)
    }

    /// Emits the pyhop methods without a template.
    ///
    /// # Errors
    /// Returns [`CodegenError`] when the program cannot be expressed for pyhop.
    pub fn imitation_methods(&self) -> Result<String, CodegenError> {
        compile_imitation(&self.program)
    }

    /// Renders the complete facility domain script.
    ///
    /// # Errors
    /// Returns [`CompileError::Codegen`] when emission fails.
    pub fn facility_script(&self, templates: &Templates) -> Result<String, CompileError> {
        let domain = self.facility_domain()?;
        debug!(max_effects = domain.max_effects, "splicing facility template");
        Ok(templates.render_facility(&domain))
    }

    /// Renders the complete imitation script.
    ///
    /// # Errors
    /// Returns [`CompileError::Codegen`] when emission fails.
    pub fn imitation_script(&self, templates: &Templates) -> Result<String, CompileError> {
        let methods = self.imitation_methods()?;
        debug!(bytes = methods.len(), "splicing imitation template");
        Ok(templates.render_imitation(&methods))
    }

    /// Renders one complete target script.
    ///
    /// # Errors
    /// Returns [`CompileError::Codegen`] when emission fails.
    pub fn compile(&self, target: Target, templates: &Templates) -> Result<String, CompileError> {
        debug!(%target, "emitting target");
        let script = match target {
            Target::Facility => self.facility_script(templates)?,
            Target::Imitation => self.imitation_script(templates)?,
        };
        info!(%target, bytes = script.len(), "rendered target script");
        Ok(script)
    }
}
