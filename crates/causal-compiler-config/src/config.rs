// crates/causal-compiler-config/src/config.rs
// ============================================================================
// Module: Causal Compiler Configuration
// Description: Configuration loading and validation for the compiler CLI.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: causal-lang, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then [`CONFIG_ENV_VAR`], then
//! [`DEFAULT_CONFIG_NAME`] in the working directory. Only the default file
//! may be absent, in which case defaults apply; anything present and invalid
//! fails closed.
//!
//! Relative paths inside the file are resolved against the working
//! directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use causal_lang::MAX_INPUT_BYTES;
use causal_lang::MAX_NESTING;
use causal_lang::ParseLimits;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "causal-compiler.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CAUSAL_COMPILER_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Accepted log levels, most to least severe.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Causal compiler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Where generated scripts are written.
    #[serde(default)]
    pub output: OutputConfig,
    /// Optional template overrides.
    #[serde(default)]
    pub templates: TemplateConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
    /// Parser limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Output layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving both scripts.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// File name of the facility domain script.
    #[serde(default = "default_facility_file")]
    pub facility_file: String,
    /// File name of the imitation script.
    #[serde(default = "default_imitation_file")]
    pub imitation_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            facility_file: default_facility_file(),
            imitation_file: default_imitation_file(),
        }
    }
}

impl OutputConfig {
    /// Validates output names and stores them trimmed.
    fn validate(&mut self) -> Result<(), ConfigError> {
        validate_path_string("output.dir", &self.dir.to_string_lossy())?;
        self.facility_file = self.facility_file.trim().to_string();
        self.imitation_file = self.imitation_file.trim().to_string();
        validate_file_name("output.facility_file", &self.facility_file)?;
        validate_file_name("output.imitation_file", &self.imitation_file)?;
        if self.facility_file == self.imitation_file {
            return Err(ConfigError::Invalid(
                "output.facility_file and output.imitation_file must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Template overrides; `None` selects the built-in template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Facility domain template path.
    #[serde(default)]
    pub facility: Option<PathBuf>,
    /// Imitation template path.
    #[serde(default)]
    pub imitation: Option<PathBuf>,
}

impl TemplateConfig {
    /// Validates template paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.facility {
            validate_path_string("templates.facility", &path.to_string_lossy())?;
        }
        if let Some(path) = &self.imitation {
            validate_path_string("templates.imitation", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level filter; one of [`LOG_LEVELS`].
    #[serde(default)]
    pub level: Option<String>,
    /// Log file; stderr when absent.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LogConfig {
    /// Validates and normalizes the level.
    fn validate(&mut self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            let normalized = level.trim().to_ascii_lowercase();
            if !LOG_LEVELS.contains(&normalized.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "log.level must be one of {}",
                    LOG_LEVELS.join(", ")
                )));
            }
            self.level = Some(normalized);
        }
        if let Some(file) = &self.file {
            validate_path_string("log.file", &file.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Parser limits; may only tighten the built-in caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum source size in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Maximum nesting depth.
    #[serde(default = "default_max_nesting")]
    pub max_nesting: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
            max_nesting: default_max_nesting(),
        }
    }
}

impl LimitsConfig {
    /// Validates limits against the hard caps.
    fn validate(self) -> Result<(), ConfigError> {
        if self.max_input_bytes == 0 || self.max_input_bytes > MAX_INPUT_BYTES {
            return Err(ConfigError::Invalid(format!(
                "limits.max_input_bytes must be between 1 and {MAX_INPUT_BYTES}"
            )));
        }
        if self.max_nesting == 0 || self.max_nesting > MAX_NESTING {
            return Err(ConfigError::Invalid(format!(
                "limits.max_nesting must be between 1 and {MAX_NESTING}"
            )));
        }
        Ok(())
    }

    /// Converts to parser limits.
    #[must_use]
    pub const fn parse_limits(self) -> ParseLimits {
        ParseLimits {
            max_input_bytes: self.max_input_bytes,
            max_nesting: self.max_nesting,
        }
    }
}

impl CompilerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        load_resolved(&resolved, explicit)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.output.validate()?;
        self.templates.validate()?;
        self.log.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag is false only for the default name.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Loads a resolved path; a missing implicit default yields defaults.
fn load_resolved(resolved: &Path, explicit: bool) -> Result<CompilerConfig, ConfigError> {
    validate_path(resolved)?;
    if !explicit && !resolved.exists() {
        let mut config = CompilerConfig::default();
        config.validate()?;
        return Ok(config);
    }
    let bytes = fs::read(resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    CompilerConfig::from_toml_str(content)
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a bare file name (no directories).
fn validate_file_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_PATH_COMPONENT_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed == "." || trimmed == ".." {
        return Err(ConfigError::Invalid(format!("{field} must be a file name, not a path")));
    }
    Ok(())
}

/// Default output directory.
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Default facility domain file name.
fn default_facility_file() -> String {
    "facility_domain.py".to_string()
}

/// Default imitation file name.
fn default_imitation_file() -> String {
    "imitation.py".to_string()
}

/// Default input size limit.
const fn default_max_input_bytes() -> usize {
    MAX_INPUT_BYTES
}

/// Default nesting limit.
const fn default_max_nesting() -> usize {
    MAX_NESTING
}
