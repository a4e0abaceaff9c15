// crates/causal-codegen/src/template.rs
// ============================================================================
// Module: Script Templates
// Description: Built-in and file-backed templates for generated scripts.
// Purpose: Splice emitted code into complete, runnable Python files.
// Dependencies: crate::facility, thiserror (via crate::error)
// ============================================================================

//! ## Overview
//! A facility template must contain [`CAUSES_MARKER`] and [`M_MARKER`]; an
//! imitation template must contain [`METHODS_MARKER`]. Markers are checked
//! when a template is loaded, so splicing itself cannot fail.
//!
//! Template files are treated as untrusted input and limited to
//! [`MAX_TEMPLATE_BYTES`].

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::TemplateError;
use crate::facility::FacilityDomain;

// ============================================================================
// SECTION: Markers and Limits
// ============================================================================

/// Line in the facility template replaced by the `causes` body.
pub const CAUSES_MARKER: &str = "    # INSERT CAUSES HERE";
/// Line in the facility template replaced by the `M` assignment.
pub const M_MARKER: &str = "M = 0 # INSERT M HERE";
/// Line in the imitation template replaced by the pyhop methods.
pub const METHODS_MARKER: &str = "# INSERT METHODS HERE";
/// Maximum template size accepted from disk.
pub const MAX_TEMPLATE_BYTES: u64 = 1024 * 1024;

/// Built-in facility domain template.
const FACILITY_TEMPLATE: &str = include_str!("../templates/facility_domain.py.tmpl");
/// Built-in imitation template.
const IMITATION_TEMPLATE: &str = include_str!("../templates/imitation.py.tmpl");

// ============================================================================
// SECTION: Templates
// ============================================================================

/// Pair of templates used to render both scripts.
///
/// # Invariants
/// - `facility` contains [`CAUSES_MARKER`] and [`M_MARKER`].
/// - `imitation` contains [`METHODS_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    /// Facility domain template text.
    facility: String,
    /// Imitation template text.
    imitation: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Templates {
    /// Returns the built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            facility: FACILITY_TEMPLATE.to_string(),
            imitation: IMITATION_TEMPLATE.to_string(),
        }
    }

    /// Replaces the facility template after checking its markers.
    ///
    /// # Errors
    /// Returns [`TemplateError::MissingMarker`] when a marker is absent.
    pub fn with_facility(mut self, text: String) -> Result<Self, TemplateError> {
        require_marker(&text, "facility", CAUSES_MARKER)?;
        require_marker(&text, "facility", M_MARKER)?;
        self.facility = text;
        Ok(self)
    }

    /// Replaces the imitation template after checking its marker.
    ///
    /// # Errors
    /// Returns [`TemplateError::MissingMarker`] when the marker is absent.
    pub fn with_imitation(mut self, text: String) -> Result<Self, TemplateError> {
        require_marker(&text, "imitation", METHODS_MARKER)?;
        self.imitation = text;
        Ok(self)
    }

    /// Loads the facility template from a file.
    ///
    /// # Errors
    /// Returns [`TemplateError`] when the file cannot be read, is too large,
    /// is not UTF-8, or lacks a marker.
    pub fn with_facility_file(self, path: &Path) -> Result<Self, TemplateError> {
        let text = read_template(path)?;
        self.with_facility(text)
    }

    /// Loads the imitation template from a file.
    ///
    /// # Errors
    /// Returns [`TemplateError`] when the file cannot be read, is too large,
    /// is not UTF-8, or lacks the marker.
    pub fn with_imitation_file(self, path: &Path) -> Result<Self, TemplateError> {
        let text = read_template(path)?;
        self.with_imitation(text)
    }

    /// Splices a facility domain into the facility template.
    #[must_use]
    pub fn render_facility(&self, domain: &FacilityDomain) -> String {
        self.facility
            .replacen(CAUSES_MARKER, &domain.causes, 1)
            .replacen(M_MARKER, &format!("M = {}", domain.max_effects), 1)
    }

    /// Splices pyhop methods into the imitation template.
    #[must_use]
    pub fn render_imitation(&self, methods: &str) -> String {
        self.imitation.replacen(METHODS_MARKER, methods, 1)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fails when `text` lacks `marker`.
fn require_marker(
    text: &str,
    template: &'static str,
    marker: &'static str,
) -> Result<(), TemplateError> {
    if text.contains(marker) {
        Ok(())
    } else {
        Err(TemplateError::MissingMarker {
            template,
            marker,
        })
    }
}

/// Reads a template file with a hard size limit.
fn read_template(path: &Path) -> Result<String, TemplateError> {
    let file = fs::File::open(path).map_err(|err| TemplateError::Io(err.to_string()))?;
    let metadata = file.metadata().map_err(|err| TemplateError::Io(err.to_string()))?;
    if metadata.len() > MAX_TEMPLATE_BYTES {
        return Err(TemplateError::Invalid(format!(
            "template exceeds {MAX_TEMPLATE_BYTES} bytes"
        )));
    }
    let mut bytes = Vec::new();
    let mut limited = file.take(MAX_TEMPLATE_BYTES + 1);
    limited.read_to_end(&mut bytes).map_err(|err| TemplateError::Io(err.to_string()))?;
    let size = u64::try_from(bytes.len()).map_err(|_| {
        TemplateError::Invalid("template size exceeds addressable memory".to_string())
    })?;
    if size > MAX_TEMPLATE_BYTES {
        return Err(TemplateError::Invalid(format!(
            "template exceeds {MAX_TEMPLATE_BYTES} bytes"
        )));
    }
    String::from_utf8(bytes)
        .map_err(|_| TemplateError::Invalid("template must be utf-8".to_string()))
}
